// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // conversion module host
pub mod config;     // YAML config + defaults
pub mod engine;     // attempts and coordination
pub mod errors;     // error classification
pub mod observability;
pub mod traits;     // module seams

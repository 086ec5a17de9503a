// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod conversion;
mod status;

pub use config::ConfigError;
pub use conversion::{ConversionError, ErrorKind};
pub use status::{StatusCode, StatusOutcome};

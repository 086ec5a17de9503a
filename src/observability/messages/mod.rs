// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `coordinator` - attempt issue, supersession, completion and failure
//! * `wasm` - module loading, negotiation and resource release

pub mod coordinator;
pub mod wasm;

/// A log message that knows its own level and fields.
pub trait StructuredLog: std::fmt::Display {
    fn log(&self);
}

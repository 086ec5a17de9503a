// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! All diagnostic output goes through message types in [`messages`]. Each is a
//! small struct implementing `Display` for the human-readable line and
//! [`messages::StructuredLog`] to emit it as a `tracing` event at its level
//! with its fields attached. This keeps format strings out of the call sites.
//!
//! # Usage
//!
//! ```rust
//! use unit_data_converter::observability::messages::coordinator::AttemptSuperseded;
//! use unit_data_converter::observability::messages::StructuredLog;
//!
//! AttemptSuperseded { generation: 3, latest: 5 }.log();
//! ```

pub mod messages;

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Host side of the conversion module ABI.
//!
//! * `loader` - compile once, negotiate exports, hand out fresh instances
//! * `surface` - typed bindings over one instance
//! * `memory` - string marshalling across linear memory
//! * `error` - host-level failures

pub mod error;
pub mod loader;
pub mod memory;
pub mod surface;

pub use error::{WasmError, WasmResult};
pub use loader::{NegotiatedModule, WasmEngineLoader};
pub use surface::WasmConverterSurface;

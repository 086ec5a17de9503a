// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod attempt;     // one conversion, start to finish
pub mod coordinator; // debounce, ordering and clear
pub mod handle;      // RAII guard over module handles
pub mod request;     // units, formats, precision, settings
pub mod state;       // session state and view

pub use attempt::{AttemptOutcome, AttemptReport};
pub use coordinator::RequestCoordinator;
pub use request::{ConversionRequest, ConversionResult, FloatingFormat, Precision, PrecisionMode, Settings, UnitType};
pub use state::{ConverterView, SessionState};

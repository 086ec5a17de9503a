// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Classification of every way a conversion attempt can fail.
//!
//! Each failure origin (module contract, marshalling, handle creation, init
//! status, conversion refusal, missing cleaned input) lands in exactly one
//! [`ConversionError`] variant, which in turn belongs to one [`ErrorKind`] and
//! renders one user-visible message. None of these escape the coordinator.

use thiserror::Error;

use crate::backends::wasm::error::WasmError;

/// The closed set of error kinds a user can be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EngineContract,
    EmptyEncoding,
    OutOfMemory,
    HandleCreation,
    InvalidValue,
    Internal,
    Unexpected,
}

/// A classified attempt failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// The module could not be loaded or is missing memory or an export.
    #[error("conversion module unavailable: {0}")]
    EngineContract(String),

    /// The input text encodes to zero bytes.
    #[error("input encodes to zero bytes")]
    EmptyEncoding,

    /// The module's allocator returned a null pointer.
    #[error("module failed to allocate {size} bytes")]
    OutOfMemory { size: u32 },

    /// `init` returned a null handle.
    #[error("module returned a null handle")]
    HandleCreation,

    /// Init status 3, or the module refused to convert the cleaned value.
    #[error("value is invalid")]
    InvalidValue,

    /// Init status 4.
    #[error("module reported an invalid handle")]
    InvalidHandle,

    /// The cleaned input was missing after a successful init, or the module trapped.
    #[error("internal error: {0}")]
    Internal(String),

    /// Any init status outside the known range.
    #[error("unexpected init status {0}")]
    Unexpected(u32),
}

impl ConversionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::EngineContract(_) => ErrorKind::EngineContract,
            ConversionError::EmptyEncoding => ErrorKind::EmptyEncoding,
            ConversionError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            ConversionError::HandleCreation => ErrorKind::HandleCreation,
            ConversionError::InvalidValue => ErrorKind::InvalidValue,
            ConversionError::InvalidHandle | ConversionError::Internal(_) => ErrorKind::Internal,
            ConversionError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// The single message shown next to the input field.
    pub fn user_message(&self) -> String {
        match self {
            ConversionError::EngineContract(detail) => detail.clone(),
            ConversionError::EmptyEncoding | ConversionError::InvalidValue => {
                "Invalid value".to_string()
            }
            ConversionError::OutOfMemory { .. } => "Out of memory".to_string(),
            ConversionError::HandleCreation => "Unable to create handle".to_string(),
            ConversionError::InvalidHandle => "Invalid UC handle".to_string(),
            ConversionError::Internal(_) => "Internal error".to_string(),
            ConversionError::Unexpected(_) => "Unexpected error".to_string(),
        }
    }
}

impl From<WasmError> for ConversionError {
    fn from(error: WasmError) -> Self {
        match error {
            // Traps and bad pointers only happen once a module is already running.
            WasmError::ExecutionError(_) | WasmError::OutOfBounds { .. } => {
                ConversionError::Internal(error.to_string())
            }
            other => ConversionError::EngineContract(other.to_string()),
        }
    }
}

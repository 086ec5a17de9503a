// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for the conversion module backend.
//!
//! These cover loading the module binary, negotiating its exported contract and
//! calling into it. The coordinator never shows these to the user directly; the
//! classifier in [`crate::errors`] folds them into the user-facing taxonomy.

use thiserror::Error;

/// Error type for all conversion module backend operations.
#[derive(Error, Debug)]
pub enum WasmError {
    /// The module does not export linear memory named `memory`.
    #[error("Instance memory is missing")]
    MissingMemory,

    /// A required function export is absent or has the wrong signature.
    #[error("`{0}` is missing")]
    MissingExport(&'static str),

    /// Module compilation or instantiation error.
    #[error("WASM module error: {0}")]
    ModuleError(String),

    /// Wasmtime engine creation or configuration error.
    #[error("Engine creation error: {0}")]
    EngineError(String),

    /// The module binary failed size or format checks.
    #[error("Invalid module: {0}")]
    ValidationError(String),

    /// File I/O error during module loading.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Memory access outside linear memory bounds.
    #[error("Memory access out of bounds: ptr={ptr}, len={len}")]
    OutOfBounds { ptr: u32, len: usize },

    /// Trap or host error raised while calling a module export.
    #[error("WASM execution error: {0}")]
    ExecutionError(#[from] wasmtime::Error),
}

impl WasmError {
    /// True when the error means the module does not satisfy the required contract.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, WasmError::MissingMemory | WasmError::MissingExport(_))
    }
}

/// Result type alias for backend operations.
pub type WasmResult<T> = Result<T, WasmError>;

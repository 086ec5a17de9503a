// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for conversion module loading and resource release.
//!
//! This module contains message types for logging events related to:
//! * Module loading and export negotiation
//! * Per-attempt instance acquisition
//! * Failures returning buffers or handles to the module

use crate::backends::wasm::error::WasmError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Module bytes read from disk.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use unit_data_converter::observability::messages::wasm::ModuleLoaded;
///
/// let msg = ModuleLoaded {
///     module_path: "zig-out/bin/unit_data_converter.wasm",
///     size_bytes: 4096,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ModuleLoaded<'a> {
    pub module_path: &'a str,
    pub size_bytes: usize,
}

impl Display for ModuleLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded conversion module '{}' ({} bytes)",
            self.module_path, self.size_bytes
        )
    }
}

impl StructuredLog for ModuleLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            module_path = self.module_path,
            size_bytes = self.size_bytes,
            "{}", self
        );
    }
}

/// Module could not be loaded, compiled or negotiated.
///
/// # Log Level
/// `error!` - The converter cannot run until this is fixed
pub struct ModuleLoadFailed<'a> {
    pub module_path: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ModuleLoadFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to load conversion module '{}': {}",
            self.module_path, self.error
        )
    }
}

impl StructuredLog for ModuleLoadFailed<'_> {
    fn log(&self) {
        tracing::error!(
            module_path = self.module_path,
            error = %self.error,
            "{}", self
        );
    }
}

/// Every required export is present with the expected shape.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct ContractNegotiated<'a> {
    pub module_path: &'a str,
    pub export_count: usize,
}

impl Display for ContractNegotiated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Module '{}' satisfies the converter contract ({} exports)",
            self.module_path, self.export_count
        )
    }
}

impl StructuredLog for ContractNegotiated<'_> {
    fn log(&self) {
        tracing::debug!(
            module_path = self.module_path,
            export_count = self.export_count,
            "{}", self
        );
    }
}

/// A fresh instance is ready for one attempt.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct InstanceAcquired {
    pub fuel_level: u64,
}

impl Display for InstanceAcquired {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Instantiated conversion module with fuel={}", self.fuel_level)
    }
}

impl StructuredLog for InstanceAcquired {
    fn log(&self) {
        tracing::debug!(fuel_level = self.fuel_level, "{}", self);
    }
}

/// `deinit` failed for a handle. The handle is considered gone regardless.
///
/// # Log Level
/// `warn!` - Potential leak inside the module instance
pub struct HandleReleaseFailed<'a> {
    pub handle: u32,
    pub error: &'a WasmError,
}

impl Display for HandleReleaseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to release handle {}: {}", self.handle, self.error)
    }
}

impl StructuredLog for HandleReleaseFailed<'_> {
    fn log(&self) {
        tracing::warn!(handle = self.handle, error = %self.error, "{}", self);
    }
}

/// `free` failed for a host-allocated buffer.
///
/// # Log Level
/// `warn!` - Potential leak inside the module instance
pub struct AllocationReleaseFailed<'a> {
    pub ptr: u32,
    pub len: u32,
    pub error: &'a WasmError,
}

impl Display for AllocationReleaseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to free {} bytes at offset {}: {}",
            self.len, self.ptr, self.error
        )
    }
}

impl StructuredLog for AllocationReleaseFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            ptr = self.ptr,
            len = self.len,
            error = %self.error,
            "{}", self
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_export_is_named() {
        let error = WasmError::MissingExport("ucInit");
        let msg = ModuleLoadFailed {
            module_path: "converter.wasm",
            error: &error,
        };
        assert_eq!(
            msg.to_string(),
            "Failed to load conversion module 'converter.wasm': `ucInit` is missing"
        );
    }

    #[test]
    fn test_release_messages() {
        let error = WasmError::MissingMemory;
        let handle = HandleReleaseFailed {
            handle: 7,
            error: &error,
        };
        assert_eq!(
            handle.to_string(),
            "Failed to release handle 7: Instance memory is missing"
        );

        let alloc = AllocationReleaseFailed {
            ptr: 1024,
            len: 5,
            error: &error,
        };
        assert!(alloc.to_string().starts_with("Failed to free 5 bytes at offset 1024"));
    }
}

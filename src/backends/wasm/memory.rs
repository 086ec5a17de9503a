// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Moving strings across the host/module memory boundary.
//!
//! Strings go in as UTF-8 bytes written into a buffer from the module's own
//! allocator. Strings come out NUL-terminated and are decoded one byte per
//! character; the module only ever emits ASCII digits, signs and exponents.

use crate::backends::wasm::error::{WasmError, WasmResult};
use crate::errors::ConversionError;
use crate::observability::messages::wasm::AllocationReleaseFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::ConverterModule;

/// A buffer in module memory holding a copy of host text.
///
/// The caller owns it and must hand it back through `free(ptr, len)` once the
/// module has consumed the bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleString {
    pub ptr: u32,
    pub len: u32,
}

/// Copy `text` into a fresh module allocation.
pub fn write_string(
    module: &mut dyn ConverterModule,
    text: &str,
) -> Result<ModuleString, ConversionError> {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return Err(ConversionError::EmptyEncoding);
    }

    let len = u32::try_from(bytes.len())
        .map_err(|_| ConversionError::OutOfMemory { size: u32::MAX })?;

    let ptr = module.alloc(len)?;
    if ptr == 0 {
        return Err(ConversionError::OutOfMemory { size: len });
    }

    if let Err(error) = copy_into(module.memory_mut(), ptr, bytes) {
        release(module, ModuleString { ptr, len });
        return Err(error.into());
    }

    Ok(ModuleString { ptr, len })
}

/// Return a buffer to the module allocator, logging rather than failing.
pub fn release(module: &mut dyn ConverterModule, string: ModuleString) {
    if let Err(error) = module.free(string.ptr, string.len) {
        AllocationReleaseFailed {
            ptr: string.ptr,
            len: string.len,
            error: &error,
        }
        .log();
    }
}

fn copy_into(memory: &mut [u8], ptr: u32, bytes: &[u8]) -> WasmResult<()> {
    let start = ptr as usize;
    let out_of_bounds = || WasmError::OutOfBounds {
        ptr,
        len: bytes.len(),
    };
    let end = start.checked_add(bytes.len()).ok_or_else(out_of_bounds)?;

    memory
        .get_mut(start..end)
        .ok_or_else(out_of_bounds)?
        .copy_from_slice(bytes);
    Ok(())
}

/// Read a NUL-terminated string starting at `ptr`.
///
/// Returns `None` for a null pointer or one past the end of memory. A string
/// without a terminator runs to the end of memory.
pub fn read_c_string(module: &dyn ConverterModule, ptr: u32) -> Option<String> {
    if ptr == 0 {
        return None;
    }

    let tail = module.memory().get(ptr as usize..)?;
    Some(
        tail.iter()
            .take_while(|&&byte| byte != 0)
            .map(|&byte| char::from(byte))
            .collect(),
    )
}

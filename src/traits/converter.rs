// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::backends::wasm::error::WasmResult;
use crate::errors::ConversionError;

/// The callable surface of one acquired conversion module instance.
///
/// Mirrors the module ABI one call per method. Pointers and handles are offsets
/// into the module's own linear memory, exposed through [`memory`] and
/// [`memory_mut`]. Implementations are expected to have negotiated every export
/// before handing the surface out, so a method here only fails on a trap.
///
/// [`memory`]: ConverterModule::memory
/// [`memory_mut`]: ConverterModule::memory_mut
pub trait ConverterModule: Send {
    fn alloc(&mut self, size: u32) -> WasmResult<u32>;

    fn free(&mut self, ptr: u32, size: u32) -> WasmResult<()>;

    /// Create a handle from `len` bytes at `ptr`. `0` means creation failed.
    fn init(&mut self, ptr: u32, len: u32) -> WasmResult<u32>;

    fn deinit(&mut self, handle: u32) -> WasmResult<()>;

    fn get_init_status(&mut self, handle: u32) -> WasmResult<u32>;

    /// Pointer to the NUL-terminated cleaned input, `0` if unavailable.
    fn get_cleaned_input(&mut self, handle: u32) -> WasmResult<u32>;

    fn begin_converting(
        &mut self,
        handle: u32,
        unit: u32,
        format: u32,
        precision: i32,
    ) -> WasmResult<bool>;

    /// Pointer to the NUL-terminated value for `unit`, `0` if not produced.
    fn get_converted_value(&mut self, handle: u32, unit: u32) -> WasmResult<u32>;

    /// Current view of linear memory.
    fn memory(&self) -> &[u8];

    fn memory_mut(&mut self) -> &mut [u8];
}

/// Hands out conversion module instances.
///
/// Acquisition is the only point where an attempt suspends. A failure here is
/// already classified, since the only thing that can go wrong is the module not
/// meeting its contract or not loading at all.
#[async_trait]
pub trait ModuleSource: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn ConverterModule>, ConversionError>;
}

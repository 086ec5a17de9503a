// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed view of one instantiated conversion module.
//!
//! The export table below is the whole contract. The loader checks it once
//! against the compiled module; [`WasmConverterSurface::instantiate`] then binds
//! each entry to a typed function for a fresh store.

use wasmtime::{Engine, Instance, Memory, Module, Store, TypedFunc};

use crate::backends::wasm::error::{WasmError, WasmResult};
use crate::traits::ConverterModule;

pub const EXPORT_MEMORY: &str = "memory";
pub const EXPORT_ALLOC: &str = "alloc";
pub const EXPORT_FREE: &str = "free";
pub const EXPORT_INIT: &str = "ucInit";
pub const EXPORT_DEINIT: &str = "ucDeinit";
pub const EXPORT_GET_INIT_STATUS: &str = "ucGetInitStatus";
pub const EXPORT_GET_CLEANED_INPUT: &str = "ucGetCleanedInputValue";
pub const EXPORT_BEGIN_CONVERTING: &str = "ucBeginConverting";
pub const EXPORT_GET_CONVERTED_VALUE: &str = "ucGetConvertedValue";

/// A required function export: name, i32 parameter count, i32 result count.
pub struct RequiredExport {
    pub name: &'static str,
    pub params: usize,
    pub results: usize,
}

/// Every function the host calls, in negotiation order.
pub const REQUIRED_FUNCTIONS: [RequiredExport; 8] = [
    RequiredExport { name: EXPORT_ALLOC, params: 1, results: 1 },
    RequiredExport { name: EXPORT_FREE, params: 2, results: 0 },
    RequiredExport { name: EXPORT_INIT, params: 2, results: 1 },
    RequiredExport { name: EXPORT_DEINIT, params: 1, results: 0 },
    RequiredExport { name: EXPORT_GET_INIT_STATUS, params: 1, results: 1 },
    RequiredExport { name: EXPORT_GET_CLEANED_INPUT, params: 1, results: 1 },
    RequiredExport { name: EXPORT_BEGIN_CONVERTING, params: 4, results: 1 },
    RequiredExport { name: EXPORT_GET_CONVERTED_VALUE, params: 2, results: 1 },
];

struct ConverterExports {
    alloc: TypedFunc<u32, u32>,
    free: TypedFunc<(u32, u32), ()>,
    init: TypedFunc<(u32, u32), u32>,
    deinit: TypedFunc<u32, ()>,
    get_init_status: TypedFunc<u32, u32>,
    get_cleaned_input: TypedFunc<u32, u32>,
    begin_converting: TypedFunc<(u32, u32, u32, i32), u32>,
    get_converted_value: TypedFunc<(u32, u32), u32>,
}

/// One live module instance with its own store and fuel budget.
pub struct WasmConverterSurface {
    store: Store<()>,
    memory: Memory,
    exports: ConverterExports,
}

impl WasmConverterSurface {
    pub fn instantiate(engine: &Engine, module: &Module, fuel: u64) -> WasmResult<Self> {
        let mut store = Store::new(engine, ());
        store.set_fuel(fuel)?;

        let instance = Instance::new(&mut store, module, &[])
            .map_err(|e| WasmError::ModuleError(e.to_string()))?;

        let memory = instance
            .get_memory(&mut store, EXPORT_MEMORY)
            .ok_or(WasmError::MissingMemory)?;

        let exports = ConverterExports {
            alloc: Self::bind(&instance, &mut store, EXPORT_ALLOC)?,
            free: Self::bind(&instance, &mut store, EXPORT_FREE)?,
            init: Self::bind(&instance, &mut store, EXPORT_INIT)?,
            deinit: Self::bind(&instance, &mut store, EXPORT_DEINIT)?,
            get_init_status: Self::bind(&instance, &mut store, EXPORT_GET_INIT_STATUS)?,
            get_cleaned_input: Self::bind(&instance, &mut store, EXPORT_GET_CLEANED_INPUT)?,
            begin_converting: Self::bind(&instance, &mut store, EXPORT_BEGIN_CONVERTING)?,
            get_converted_value: Self::bind(&instance, &mut store, EXPORT_GET_CONVERTED_VALUE)?,
        };

        Ok(Self {
            store,
            memory,
            exports,
        })
    }

    fn bind<Params, Results>(
        instance: &Instance,
        store: &mut Store<()>,
        name: &'static str,
    ) -> WasmResult<TypedFunc<Params, Results>>
    where
        Params: wasmtime::WasmParams,
        Results: wasmtime::WasmResults,
    {
        instance
            .get_typed_func::<Params, Results>(&mut *store, name)
            .map_err(|_| WasmError::MissingExport(name))
    }

    /// Fuel left in this instance's budget.
    pub fn remaining_fuel(&self) -> u64 {
        self.store.get_fuel().unwrap_or(0)
    }
}

impl ConverterModule for WasmConverterSurface {
    fn alloc(&mut self, size: u32) -> WasmResult<u32> {
        Ok(self.exports.alloc.call(&mut self.store, size)?)
    }

    fn free(&mut self, ptr: u32, size: u32) -> WasmResult<()> {
        Ok(self.exports.free.call(&mut self.store, (ptr, size))?)
    }

    fn init(&mut self, ptr: u32, len: u32) -> WasmResult<u32> {
        Ok(self.exports.init.call(&mut self.store, (ptr, len))?)
    }

    fn deinit(&mut self, handle: u32) -> WasmResult<()> {
        Ok(self.exports.deinit.call(&mut self.store, handle)?)
    }

    fn get_init_status(&mut self, handle: u32) -> WasmResult<u32> {
        Ok(self.exports.get_init_status.call(&mut self.store, handle)?)
    }

    fn get_cleaned_input(&mut self, handle: u32) -> WasmResult<u32> {
        Ok(self.exports.get_cleaned_input.call(&mut self.store, handle)?)
    }

    fn begin_converting(
        &mut self,
        handle: u32,
        unit: u32,
        format: u32,
        precision: i32,
    ) -> WasmResult<bool> {
        let converted = self
            .exports
            .begin_converting
            .call(&mut self.store, (handle, unit, format, precision))?;
        Ok(converted != 0)
    }

    fn get_converted_value(&mut self, handle: u32, unit: u32) -> WasmResult<u32> {
        Ok(self
            .exports
            .get_converted_value
            .call(&mut self.store, (handle, unit))?)
    }

    fn memory(&self) -> &[u8] {
        self.memory.data(&self.store)
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        self.memory.data_mut(&mut self.store)
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process stand-in for the conversion module, for tests.
//!
//! `FakeConverterModule` implements the module ABI over a plain byte vector with
//! a reference conversion algorithm, and records every call into a shared
//! [`ModuleLedger`] so tests can check allocation and handle discipline across
//! many acquisitions. `FakeModuleSource` hands these out with optional
//! acquisition latency or failure.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::backends::wasm::error::WasmResult;
use crate::engine::request::UnitType;
use crate::errors::ConversionError;
use crate::traits::{ConverterModule, ModuleSource};

pub const FAKE_MEMORY_SIZE: usize = 64 * 1024;
const HOST_HEAP: (u32, u32) = (1024, 32 * 1024);
const MODULE_HEAP: (u32, u32) = (32 * 1024, FAKE_MEMORY_SIZE as u32);

/// Knobs for steering the fake into each failure branch.
#[derive(Debug, Clone, Default)]
pub struct FakeBehavior {
    pub fail_alloc: bool,
    /// `alloc` hands back a pointer whose buffer runs past the end of memory.
    pub alloc_out_of_bounds: bool,
    pub null_handle: bool,
    pub forced_status: Option<u32>,
    pub missing_cleaned_input: bool,
    pub refuse_conversion: bool,
    pub trap_on_convert: bool,
    pub omitted_units: Vec<UnitType>,
}

/// Everything the host asked of the module, across all instances.
#[derive(Debug, Clone, Default)]
pub struct ModuleLedger {
    pub host_allocs: Vec<(u32, u32)>,
    pub host_frees: Vec<(u32, u32)>,
    pub handles_created: Vec<u32>,
    pub deinits: Vec<u32>,
    pub inputs: Vec<String>,
    pub cleaned_reads: usize,
    pub conversions: Vec<(u32, u32, i32)>,
}

impl ModuleLedger {
    /// Every allocation freed once with its size; every handle released once.
    pub fn assert_balanced(&self) {
        let mut allocs = self.host_allocs.clone();
        let mut frees = self.host_frees.clone();
        allocs.sort_unstable();
        frees.sort_unstable();
        assert_eq!(allocs, frees, "allocations and frees do not match");

        let mut created = self.handles_created.clone();
        let mut released = self.deinits.clone();
        created.sort_unstable();
        released.sort_unstable();
        assert_eq!(created, released, "handles not released exactly once");
    }
}

struct FakeHandle {
    cleaned: String,
    value: f64,
    status: u32,
    results: BTreeMap<u32, String>,
}

pub struct FakeConverterModule {
    memory: Vec<u8>,
    behavior: FakeBehavior,
    ledger: Arc<Mutex<ModuleLedger>>,
    next_host: u32,
    next_module: u32,
    handles: HashMap<u32, FakeHandle>,
}

impl FakeConverterModule {
    pub fn new(behavior: FakeBehavior) -> Self {
        Self::with_ledger(behavior, Arc::new(Mutex::new(ModuleLedger::default())))
    }

    pub fn with_ledger(behavior: FakeBehavior, ledger: Arc<Mutex<ModuleLedger>>) -> Self {
        Self {
            memory: vec![0; FAKE_MEMORY_SIZE],
            behavior,
            ledger,
            next_host: HOST_HEAP.0,
            next_module: MODULE_HEAP.0,
            handles: HashMap::new(),
        }
    }

    pub fn ledger(&self) -> ModuleLedger {
        self.ledger.lock().unwrap().clone()
    }

    fn bump(next: &mut u32, heap: (u32, u32), size: u32) -> u32 {
        if *next + size > heap.1 {
            *next = heap.0;
        }
        let ptr = *next;
        *next += size;
        ptr
    }

    /// Store a NUL-terminated copy of `text` in module-owned memory.
    fn emit(&mut self, text: &str) -> u32 {
        let ptr = Self::bump(&mut self.next_module, MODULE_HEAP, text.len() as u32 + 1);
        let start = ptr as usize;
        self.memory[start..start + text.len()].copy_from_slice(text.as_bytes());
        self.memory[start + text.len()] = 0;
        ptr
    }

    fn clean(raw: &str) -> (String, f64, u32) {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ',' && *c != '_')
            .collect();

        if cleaned.is_empty() {
            return (cleaned, 0.0, 2);
        }
        match cleaned.parse::<f64>() {
            Ok(value) if value.is_finite() && value > 0.0 => (cleaned, value, 0),
            Ok(value) if value == 0.0 => (cleaned, value, 1),
            _ => (cleaned, 0.0, 3),
        }
    }

    fn render(value: f64, format: u32, precision: i32) -> String {
        match (format, precision) {
            (1, digits) if digits >= 0 => format!("{:.*}", digits as usize, value),
            (1, _) => format!("{}", value),
            (_, digits) if digits >= 0 => format!("{:.*e}", digits as usize, value),
            _ => format!("{:e}", value),
        }
    }
}

impl ConverterModule for FakeConverterModule {
    fn alloc(&mut self, size: u32) -> WasmResult<u32> {
        if self.behavior.fail_alloc {
            return Ok(0);
        }
        let ptr = if self.behavior.alloc_out_of_bounds {
            FAKE_MEMORY_SIZE as u32 - 1
        } else {
            Self::bump(&mut self.next_host, HOST_HEAP, size)
        };
        self.ledger.lock().unwrap().host_allocs.push((ptr, size));
        Ok(ptr)
    }

    fn free(&mut self, ptr: u32, size: u32) -> WasmResult<()> {
        self.ledger.lock().unwrap().host_frees.push((ptr, size));
        Ok(())
    }

    fn init(&mut self, ptr: u32, len: u32) -> WasmResult<u32> {
        let start = ptr as usize;
        let raw = String::from_utf8_lossy(&self.memory[start..start + len as usize]).to_string();

        let mut ledger = self.ledger.lock().unwrap();
        ledger.inputs.push(raw.clone());
        if self.behavior.null_handle {
            return Ok(0);
        }

        let handle = ledger.handles_created.len() as u32 + 1;
        ledger.handles_created.push(handle);
        drop(ledger);

        let (cleaned, value, status) = Self::clean(&raw);
        self.handles.insert(
            handle,
            FakeHandle {
                cleaned,
                value,
                status: self.behavior.forced_status.unwrap_or(status),
                results: BTreeMap::new(),
            },
        );
        Ok(handle)
    }

    fn deinit(&mut self, handle: u32) -> WasmResult<()> {
        self.ledger.lock().unwrap().deinits.push(handle);
        self.handles.remove(&handle);
        Ok(())
    }

    fn get_init_status(&mut self, handle: u32) -> WasmResult<u32> {
        Ok(self.handles.get(&handle).map_or(4, |h| h.status))
    }

    fn get_cleaned_input(&mut self, handle: u32) -> WasmResult<u32> {
        self.ledger.lock().unwrap().cleaned_reads += 1;
        if self.behavior.missing_cleaned_input {
            return Ok(0);
        }
        let cleaned = match self.handles.get(&handle) {
            Some(h) => h.cleaned.clone(),
            None => return Ok(0),
        };
        Ok(self.emit(&cleaned))
    }

    fn begin_converting(
        &mut self,
        handle: u32,
        unit: u32,
        format: u32,
        precision: i32,
    ) -> WasmResult<bool> {
        self.ledger
            .lock()
            .unwrap()
            .conversions
            .push((unit, format, precision));

        if self.behavior.trap_on_convert {
            return Err(wasmtime::Error::msg("wasm trap: wasm `unreachable` instruction executed").into());
        }
        if self.behavior.refuse_conversion || unit > 4 || format > 1 {
            return Ok(false);
        }

        let omitted = self.behavior.omitted_units.clone();
        let Some(state) = self.handles.get_mut(&handle) else {
            return Ok(false);
        };

        let bytes = state.value * 1024f64.powi(unit as i32);
        state.results.clear();
        for target in UnitType::ALL {
            if omitted.contains(&target) {
                continue;
            }
            let value = bytes / 1024f64.powi(target.index() as i32);
            state
                .results
                .insert(target.index(), Self::render(value, format, precision));
        }
        Ok(true)
    }

    fn get_converted_value(&mut self, handle: u32, unit: u32) -> WasmResult<u32> {
        let value = self
            .handles
            .get(&handle)
            .and_then(|h| h.results.get(&unit).cloned());
        Ok(value.map_or(0, |text| self.emit(&text)))
    }

    fn memory(&self) -> &[u8] {
        &self.memory
    }

    fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }
}

/// Hands out fakes sharing one ledger, optionally slowly or not at all.
pub struct FakeModuleSource {
    behavior: FakeBehavior,
    ledger: Arc<Mutex<ModuleLedger>>,
    delays: Mutex<VecDeque<Duration>>,
    failure: Option<ConversionError>,
    acquisitions: AtomicUsize,
}

impl FakeModuleSource {
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            ledger: Arc::new(Mutex::new(ModuleLedger::default())),
            delays: Mutex::new(VecDeque::new()),
            failure: None,
            acquisitions: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: ConversionError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(FakeBehavior::default())
        }
    }

    /// Latency for successive acquisitions, in call order.
    pub fn with_delays(self, delays: impl IntoIterator<Item = Duration>) -> Self {
        *self.delays.lock().unwrap() = delays.into_iter().collect();
        self
    }

    pub fn ledger(&self) -> ModuleLedger {
        self.ledger.lock().unwrap().clone()
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModuleSource for FakeModuleSource {
    async fn acquire(&self) -> Result<Box<dyn ConverterModule>, ConversionError> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(Box::new(FakeConverterModule::with_ledger(
            self.behavior.clone(),
            Arc::clone(&self.ledger),
        )))
    }
}

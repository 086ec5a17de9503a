// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Conversion Module Loading and Contract Negotiation
//!
//! This module turns a module file into instances the coordinator can call:
//! - File I/O and size validation
//! - Compilation with a locked-down wasmtime engine
//! - One-time negotiation of the export contract (memory plus eight functions)
//! - Per-attempt instantiation with a fresh store and fuel budget
//!
//! The compiled, negotiated module is cached for the session after the first
//! successful load. A failed load is not cached, so the next attempt tries again.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use wasmtime::{Config, Engine, ExternType, Module, ValType};

use crate::backends::wasm::error::{WasmError, WasmResult};
use crate::backends::wasm::surface::{WasmConverterSurface, EXPORT_MEMORY, REQUIRED_FUNCTIONS};
use crate::config::consts::MAX_MODULE_SIZE;
use crate::errors::ConversionError;
use crate::observability::messages::wasm::{
    ContractNegotiated, InstanceAcquired, ModuleLoadFailed, ModuleLoaded,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{ConverterModule, ModuleSource};

/// A compiled module whose exports satisfy the conversion contract.
pub struct NegotiatedModule {
    engine: Engine,
    module: Module,
    module_path: String,
}

impl NegotiatedModule {
    /// Compile and negotiate a module from raw bytes.
    pub fn from_bytes(module_path: &str, bytes: &[u8]) -> WasmResult<Self> {
        if bytes.len() > MAX_MODULE_SIZE {
            return Err(WasmError::ValidationError(format!(
                "WASM module too large: {} bytes (max: {} bytes)",
                bytes.len(),
                MAX_MODULE_SIZE
            )));
        }

        let engine = create_engine()?;
        let module =
            Module::new(&engine, bytes).map_err(|e| WasmError::ModuleError(e.to_string()))?;
        negotiate_contract(&module)?;

        ContractNegotiated {
            module_path,
            export_count: REQUIRED_FUNCTIONS.len() + 1,
        }
        .log();

        Ok(Self {
            engine,
            module,
            module_path: module_path.to_string(),
        })
    }

    /// Read, compile and negotiate a module file.
    pub fn load<P: AsRef<Path>>(module_path: P) -> WasmResult<Self> {
        let module_path_str = module_path.as_ref().to_string_lossy().to_string();
        let bytes = std::fs::read(module_path.as_ref())?;

        ModuleLoaded {
            module_path: &module_path_str,
            size_bytes: bytes.len(),
        }
        .log();

        Self::from_bytes(&module_path_str, &bytes)
    }

    pub fn instantiate(&self, fuel: u64) -> WasmResult<WasmConverterSurface> {
        WasmConverterSurface::instantiate(&self.engine, &self.module, fuel)
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }
}

/// Create wasmtime engine with security-focused configuration
fn create_engine() -> WasmResult<Engine> {
    let mut config = Config::new();

    config.wasm_threads(false);
    config.wasm_simd(false);
    config.wasm_relaxed_simd(false);
    config.wasm_multi_memory(false);
    config.wasm_memory64(false);
    config.wasm_component_model(false);

    // Fuel bounds each attempt; a runaway module traps instead of hanging the session.
    config.consume_fuel(true);
    config.epoch_interruption(false);

    Engine::new(&config).map_err(|e| WasmError::EngineError(e.to_string()))
}

/// Check the compiled module's exports against the required contract.
///
/// Memory is checked first, then each function in table order; the first
/// mismatch is reported.
fn negotiate_contract(module: &Module) -> WasmResult<()> {
    let has_memory = module
        .exports()
        .any(|export| export.name() == EXPORT_MEMORY && matches!(export.ty(), ExternType::Memory(_)));
    if !has_memory {
        return Err(WasmError::MissingMemory);
    }

    for required in REQUIRED_FUNCTIONS.iter() {
        let matches_signature = module.exports().any(|export| {
            if export.name() != required.name {
                return false;
            }
            match export.ty() {
                ExternType::Func(func) => {
                    func.params().len() == required.params
                        && func.results().len() == required.results
                        && func.params().all(|ty| matches!(ty, ValType::I32))
                        && func.results().all(|ty| matches!(ty, ValType::I32))
                }
                _ => false,
            }
        });

        if !matches_signature {
            return Err(WasmError::MissingExport(required.name));
        }
    }

    Ok(())
}

/// Engine loader: lazily loads the module file and hands out fresh instances.
pub struct WasmEngineLoader {
    module_path: PathBuf,
    fuel: u64,
    negotiated: OnceCell<Arc<NegotiatedModule>>,
}

impl WasmEngineLoader {
    pub fn new<P: Into<PathBuf>>(module_path: P, fuel: u64) -> Self {
        Self {
            module_path: module_path.into(),
            fuel,
            negotiated: OnceCell::new(),
        }
    }

    /// Build a loader around an already negotiated module.
    pub fn with_module(module: NegotiatedModule, fuel: u64) -> Self {
        Self {
            module_path: PathBuf::from(module.module_path()),
            fuel,
            negotiated: OnceCell::new_with(Some(Arc::new(module))),
        }
    }

    async fn negotiated(&self) -> Result<Arc<NegotiatedModule>, ConversionError> {
        let module = self
            .negotiated
            .get_or_try_init(|| async {
                let path = self.module_path.clone();
                let loaded = tokio::task::spawn_blocking(move || NegotiatedModule::load(&path))
                    .await
                    .map_err(|e| ConversionError::Internal(format!("module load task failed: {}", e)))?;

                loaded.map(Arc::new).map_err(|error| {
                    ModuleLoadFailed {
                        module_path: &self.module_path.to_string_lossy(),
                        error: &error,
                    }
                    .log();
                    ConversionError::from(error)
                })
            })
            .await?;

        Ok(Arc::clone(module))
    }
}

#[async_trait]
impl ModuleSource for WasmEngineLoader {
    async fn acquire(&self) -> Result<Box<dyn ConverterModule>, ConversionError> {
        let negotiated = self.negotiated().await?;
        let fuel = self.fuel;

        let surface = tokio::task::spawn_blocking(move || negotiated.instantiate(fuel))
            .await
            .map_err(|e| ConversionError::Internal(format!("instantiation task failed: {}", e)))??;

        InstanceAcquired {
            fuel_level: surface.remaining_fuel(),
        }
        .log();

        Ok(Box::new(surface))
    }
}

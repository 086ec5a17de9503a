// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Owning guard for the module's per-request handle.
//!
//! An [`EngineHandle`] exists only for a non-zero handle and releases it through
//! `deinit` exactly once: either explicitly via [`EngineHandle::release`] or on
//! drop. Every early return in an attempt therefore releases the handle without
//! further bookkeeping.
//!
//! ```text
//! create ──► Initialized ──inspect──► Cleanable ──► (convert) ──► released
//!                              └────► status != 0 ──► released
//! ```

use std::num::NonZeroU32;

use crate::backends::wasm::memory::{read_c_string, release, write_string};
use crate::engine::request::{ConversionRequest, ConversionResult, UnitType};
use crate::errors::{ConversionError, StatusCode, StatusOutcome};
use crate::observability::messages::wasm::HandleReleaseFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::ConverterModule;

pub struct EngineHandle<'m> {
    module: &'m mut dyn ConverterModule,
    handle: Option<NonZeroU32>,
}

/// Result of inspecting a new handle's init status.
pub enum Inspection<'m> {
    /// Status was OK; the handle can be cleaned and converted.
    Cleanable(EngineHandle<'m>),
    /// The value is zero. The handle has been released.
    ZeroValue,
    /// The value is empty. The handle has been released.
    EmptyValue,
}

impl<'m> EngineHandle<'m> {
    /// Marshal `text` into the module and create a handle from it.
    ///
    /// The input buffer is freed right after `init` reads it, whether or not a
    /// handle came back.
    pub fn create(module: &'m mut dyn ConverterModule, text: &str) -> Result<Self, ConversionError> {
        let input = write_string(module, text)?;
        let created = module.init(input.ptr, input.len);
        release(module, input);

        let handle = NonZeroU32::new(created?).ok_or(ConversionError::HandleCreation)?;
        Ok(Self {
            module,
            handle: Some(handle),
        })
    }

    /// Raw handle value, `0` once released.
    pub fn raw(&self) -> u32 {
        self.handle.map_or(0, NonZeroU32::get)
    }

    /// Read the init status. Any status other than OK releases the handle.
    pub fn inspect(mut self) -> Result<Inspection<'m>, ConversionError> {
        let status = StatusCode::from(self.module.get_init_status(self.raw())?);

        match status.classify() {
            StatusOutcome::Proceed => Ok(Inspection::Cleanable(self)),
            StatusOutcome::ClearOutputs => {
                self.release();
                Ok(Inspection::ZeroValue)
            }
            StatusOutcome::ResetInput => {
                self.release();
                Ok(Inspection::EmptyValue)
            }
            StatusOutcome::Fail(error) => {
                self.release();
                Err(error)
            }
        }
    }

    /// The module's normalized form of the input, if it produced one.
    pub fn cleaned_input(&mut self) -> Result<Option<String>, ConversionError> {
        let ptr = self.module.get_cleaned_input(self.raw())?;
        Ok(read_c_string(&*self.module, ptr))
    }

    /// Ask the module to convert. A refusal is an invalid value.
    pub fn begin_converting(&mut self, request: &ConversionRequest) -> Result<(), ConversionError> {
        let converted = self.module.begin_converting(
            self.raw(),
            request.unit.index(),
            request.format.index(),
            request.precision.module_value(),
        )?;

        if converted {
            Ok(())
        } else {
            Err(ConversionError::InvalidValue)
        }
    }

    /// Collect whichever unit values the module produced.
    pub fn converted_values(&mut self) -> Result<ConversionResult, ConversionError> {
        let mut result = ConversionResult::default();
        for unit in UnitType::ALL {
            let ptr = self.module.get_converted_value(self.raw(), unit.index())?;
            if let Some(value) = read_c_string(&*self.module, ptr) {
                result.insert(unit, value);
            }
        }
        Ok(result)
    }

    pub fn release(mut self) {
        self.deinit_once();
    }

    fn deinit_once(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(error) = self.module.deinit(handle.get()) {
                HandleReleaseFailed {
                    handle: handle.get(),
                    error: &error,
                }
                .log();
            }
        }
    }
}

impl Drop for EngineHandle<'_> {
    fn drop(&mut self) {
        self.deinit_once();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{FakeBehavior, FakeConverterModule};
    use crate::engine::request::{FloatingFormat, Precision};
    use crate::errors::ErrorKind;

    fn request(unit: UnitType) -> ConversionRequest {
        ConversionRequest {
            raw_input: "1024".to_string(),
            unit,
            format: FloatingFormat::Decimal,
            precision: Precision::Automatic,
            suppress_if_unchanged: false,
        }
    }

    #[test]
    fn test_create_frees_input_and_drop_releases() {
        let mut module = FakeConverterModule::new(FakeBehavior::default());
        {
            let handle = EngineHandle::create(&mut module, "1,024").unwrap();
            assert_eq!(handle.raw(), 1);
        }

        let ledger = module.ledger();
        assert_eq!(ledger.inputs, vec!["1,024".to_string()]);
        assert_eq!(ledger.deinits, vec![1]);
        ledger.assert_balanced();
    }

    #[test]
    fn test_release_is_not_repeated_on_drop() {
        let mut module = FakeConverterModule::new(FakeBehavior::default());
        let handle = EngineHandle::create(&mut module, "8").unwrap();
        handle.release();

        assert_eq!(module.ledger().deinits, vec![1]);
    }

    #[test]
    fn test_null_handle_frees_input() {
        let mut module = FakeConverterModule::new(FakeBehavior {
            null_handle: true,
            ..FakeBehavior::default()
        });

        let error = EngineHandle::create(&mut module, "8").err().unwrap();
        assert_eq!(error.kind(), ErrorKind::HandleCreation);
        let ledger = module.ledger();
        assert!(ledger.deinits.is_empty());
        ledger.assert_balanced();
    }

    #[test]
    fn test_inspect_zero_and_empty_release_handle() {
        let mut module = FakeConverterModule::new(FakeBehavior::default());
        let handle = EngineHandle::create(&mut module, "0").unwrap();
        assert!(matches!(handle.inspect(), Ok(Inspection::ZeroValue)));

        let handle = EngineHandle::create(&mut module, " , ").unwrap();
        assert!(matches!(handle.inspect(), Ok(Inspection::EmptyValue)));

        module.ledger().assert_balanced();
    }

    #[test]
    fn test_inspect_failures_release_handle() {
        for (status, kind) in [
            (3, ErrorKind::InvalidValue),
            (4, ErrorKind::Internal),
            (17, ErrorKind::Unexpected),
        ] {
            let mut module = FakeConverterModule::new(FakeBehavior {
                forced_status: Some(status),
                ..FakeBehavior::default()
            });
            let handle = EngineHandle::create(&mut module, "12").unwrap();
            match handle.inspect() {
                Err(error) => assert_eq!(error.kind(), kind),
                Ok(_) => panic!("Expected status {} to fail", status),
            }
            assert_eq!(module.ledger().deinits, vec![1]);
        }
    }

    #[test]
    fn test_full_lifecycle_reads_values() {
        let mut module = FakeConverterModule::new(FakeBehavior::default());
        let handle = EngineHandle::create(&mut module, "1,024").unwrap();
        let Ok(Inspection::Cleanable(mut handle)) = handle.inspect() else {
            panic!("Expected a cleanable handle");
        };

        assert_eq!(handle.cleaned_input().unwrap().as_deref(), Some("1024"));
        handle.begin_converting(&request(UnitType::Byte)).unwrap();
        let values = handle.converted_values().unwrap();
        handle.release();

        assert_eq!(values.get(UnitType::Byte), Some("1024"));
        assert_eq!(values.get(UnitType::KiB), Some("1"));
        module.ledger().assert_balanced();
    }

    #[test]
    fn test_refused_conversion_is_invalid_value() {
        let mut module = FakeConverterModule::new(FakeBehavior {
            refuse_conversion: true,
            ..FakeBehavior::default()
        });
        let handle = EngineHandle::create(&mut module, "5").unwrap();
        let Ok(Inspection::Cleanable(mut handle)) = handle.inspect() else {
            panic!("Expected a cleanable handle");
        };

        let error = handle.begin_converting(&request(UnitType::GiB)).unwrap_err();
        assert_eq!(error, ConversionError::InvalidValue);
        drop(handle);
        assert_eq!(module.ledger().deinits, vec![1]);
    }

    #[test]
    fn test_trap_releases_handle() {
        let mut module = FakeConverterModule::new(FakeBehavior {
            trap_on_convert: true,
            ..FakeBehavior::default()
        });
        let handle = EngineHandle::create(&mut module, "5").unwrap();
        let Ok(Inspection::Cleanable(mut handle)) = handle.inspect() else {
            panic!("Expected a cleanable handle");
        };

        let error = handle.begin_converting(&request(UnitType::Byte)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Internal);
        drop(handle);
        module.ledger().assert_balanced();
    }
}

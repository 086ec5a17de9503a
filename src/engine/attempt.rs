// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One conversion attempt, from raw text to five output slots.
//!
//! Runs synchronously once the module is in hand. Steps in order: marshal the
//! input and create a handle, inspect its status, read the cleaned input,
//! update the previous-input cache, convert, read back each unit. The caller
//! holds the session lock for the duration and has already checked that this
//! attempt is the newest one.

use crate::engine::handle::{EngineHandle, Inspection};
use crate::engine::request::ConversionRequest;
use crate::engine::state::SessionState;
use crate::errors::ConversionError;
use crate::traits::ConverterModule;

/// How a successful attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Outputs were replaced with fresh values.
    Converted,
    /// Cleaned input matched the previous one; the convert step was skipped.
    Unchanged,
    /// The module reported a zero value; outputs were cleared.
    ZeroValue,
    /// The module reported an empty value; input and outputs were cleared.
    EmptyValue,
}

impl AttemptOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Converted => "converted",
            AttemptOutcome::Unchanged => "unchanged",
            AttemptOutcome::ZeroValue => "zero value",
            AttemptOutcome::EmptyValue => "empty value",
        }
    }
}

/// What happened to an issued attempt, as seen by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptReport {
    /// A newer attempt or a clear was issued first; nothing was written.
    Superseded,
    /// Input was empty; state was cleared without touching the module.
    EmptyInput,
    Completed(AttemptOutcome),
    Failed(ConversionError),
}

pub fn execute(
    module: &mut dyn ConverterModule,
    request: &ConversionRequest,
    state: &mut SessionState,
) -> Result<AttemptOutcome, ConversionError> {
    let handle = EngineHandle::create(module, &request.raw_input)?;

    let mut handle = match handle.inspect()? {
        Inspection::Cleanable(handle) => handle,
        Inspection::ZeroValue => {
            state.previous_input.clear();
            state.clear_outputs();
            return Ok(AttemptOutcome::ZeroValue);
        }
        Inspection::EmptyValue => {
            state.input_text.clear();
            state.previous_input.clear();
            state.clear_outputs();
            return Ok(AttemptOutcome::EmptyValue);
        }
    };

    let Some(cleaned) = handle.cleaned_input()? else {
        state.input_text.clear();
        state.previous_input.clear();
        return Err(ConversionError::Internal(
            "cleaned input unavailable after successful init".to_string(),
        ));
    };

    state.input_text = cleaned.clone();
    if request.suppress_if_unchanged && state.previous_input == cleaned {
        return Ok(AttemptOutcome::Unchanged);
    }
    // Written before converting so a later attempt compares against the newest value.
    state.previous_input = cleaned;

    handle.begin_converting(request)?;
    let values = handle.converted_values()?;
    handle.release();

    state.outputs = values;
    Ok(AttemptOutcome::Converted)
}

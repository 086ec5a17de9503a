// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::request::{ConversionResult, UnitType};
use crate::errors::ConversionError;

/// Shared mutable state of one converter session.
///
/// Only the coordinator writes this, and only for the newest issued attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub input_text: String,
    pub error_message: String,
    pub outputs: ConversionResult,
    /// Cleaned form of the last input that reached the convert step.
    pub previous_input: String,
}

impl SessionState {
    pub fn clear_outputs(&mut self) {
        self.outputs.clear();
    }

    /// Show a classified error: outputs go, the message replaces any previous one.
    pub fn fail(&mut self, error: &ConversionError) {
        self.outputs.clear();
        self.error_message = error.user_message();
    }

    /// The clear-all action.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn view(&self) -> ConverterView {
        ConverterView {
            input_text: self.input_text.clone(),
            error_message: self.error_message.clone(),
            outputs: self.outputs.clone(),
        }
    }
}

/// What the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConverterView {
    pub input_text: String,
    pub error_message: String,
    pub outputs: ConversionResult,
}

impl ConverterView {
    /// Output for `unit`, empty when the module produced none.
    pub fn output(&self, unit: UnitType) -> &str {
        self.outputs.get(unit).unwrap_or("")
    }

    pub fn is_blank(&self) -> bool {
        self.input_text.is_empty() && self.error_message.is_empty() && self.outputs.is_empty()
    }
}

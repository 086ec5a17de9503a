// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ConversionError;

/// Status reported by the module for a freshly created handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    ZeroValue,
    EmptyValue,
    InvalidValue,
    InvalidHandle,
    Unexpected(u32),
}

/// What the caller does after inspecting an init status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    /// Continue to the clean and convert steps.
    Proceed,
    /// The value is zero: clear outputs and the cache, no message.
    ClearOutputs,
    /// The value is empty: also reset the input text, no message.
    ResetInput,
    Fail(ConversionError),
}

impl From<u32> for StatusCode {
    fn from(code: u32) -> Self {
        match code {
            0 => StatusCode::Ok,
            1 => StatusCode::ZeroValue,
            2 => StatusCode::EmptyValue,
            3 => StatusCode::InvalidValue,
            4 => StatusCode::InvalidHandle,
            other => StatusCode::Unexpected(other),
        }
    }
}

impl StatusCode {
    pub fn classify(self) -> StatusOutcome {
        match self {
            StatusCode::Ok => StatusOutcome::Proceed,
            StatusCode::ZeroValue => StatusOutcome::ClearOutputs,
            StatusCode::EmptyValue => StatusOutcome::ResetInput,
            StatusCode::InvalidValue => StatusOutcome::Fail(ConversionError::InvalidValue),
            StatusCode::InvalidHandle => StatusOutcome::Fail(ConversionError::InvalidHandle),
            StatusCode::Unexpected(code) => StatusOutcome::Fail(ConversionError::Unexpected(code)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn test_silent_statuses_carry_no_error() {
        assert_eq!(StatusCode::from(0).classify(), StatusOutcome::Proceed);
        assert_eq!(StatusCode::from(1).classify(), StatusOutcome::ClearOutputs);
        assert_eq!(StatusCode::from(2).classify(), StatusOutcome::ResetInput);
    }

    #[test]
    fn test_error_statuses() {
        let kind_of = |code: u32| match StatusCode::from(code).classify() {
            StatusOutcome::Fail(error) => error.kind(),
            other => panic!("Expected failure for status {}, got {:?}", code, other),
        };

        assert_eq!(kind_of(3), ErrorKind::InvalidValue);
        assert_eq!(kind_of(4), ErrorKind::Internal);
        assert_eq!(kind_of(5), ErrorKind::Unexpected);
        assert_eq!(kind_of(u32::MAX), ErrorKind::Unexpected);
    }
}

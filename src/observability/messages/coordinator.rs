// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for request coordination events.
//!
//! Every attempt carries the generation it was issued under, so a log line can
//! be matched to the event that caused it and to the event that superseded it.

use crate::engine::attempt::AttemptOutcome;
use crate::errors::ConversionError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A conversion attempt was issued.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
///
/// # Example
/// ```
/// use unit_data_converter::observability::messages::coordinator::AttemptIssued;
///
/// let msg = AttemptIssued {
///     generation: 4,
///     trigger: "edit",
///     input_len: 5,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct AttemptIssued<'a> {
    pub generation: u64,
    pub trigger: &'a str,
    pub input_len: usize,
}

impl Display for AttemptIssued<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Attempt {} issued by {} ({} input bytes)",
            self.generation, self.trigger, self.input_len
        )
    }
}

impl StructuredLog for AttemptIssued<'_> {
    fn log(&self) {
        tracing::debug!(
            generation = self.generation,
            trigger = self.trigger,
            input_len = self.input_len,
            "{}", self
        );
    }
}

/// An attempt found a newer event had been issued and discarded its work.
///
/// # Log Level
/// `debug!` - Expected under rapid input
pub struct AttemptSuperseded {
    pub generation: u64,
    pub latest: u64,
}

impl Display for AttemptSuperseded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Attempt {} superseded by generation {}",
            self.generation, self.latest
        )
    }
}

impl StructuredLog for AttemptSuperseded {
    fn log(&self) {
        tracing::debug!(generation = self.generation, latest = self.latest, "{}", self);
    }
}

/// An attempt applied its result to the session.
///
/// # Log Level
/// `info!` - Important operational event
pub struct AttemptCompleted<'a> {
    pub generation: u64,
    pub outcome: &'a AttemptOutcome,
}

impl Display for AttemptCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Attempt {} completed: {}",
            self.generation,
            self.outcome.label()
        )
    }
}

impl StructuredLog for AttemptCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            generation = self.generation,
            outcome = self.outcome.label(),
            "{}", self
        );
    }
}

/// An attempt failed and its message was shown to the user.
///
/// # Log Level
/// `warn!` for input problems, `error!` for everything else
pub struct AttemptFailed<'a> {
    pub generation: u64,
    pub error: &'a ConversionError,
}

impl Display for AttemptFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Attempt {} failed: {}", self.generation, self.error)
    }
}

impl StructuredLog for AttemptFailed<'_> {
    fn log(&self) {
        let kind = format!("{:?}", self.error.kind());
        match self.error {
            ConversionError::InvalidValue | ConversionError::EmptyEncoding => tracing::warn!(
                generation = self.generation,
                kind = %kind,
                "{}", self
            ),
            _ => tracing::error!(
                generation = self.generation,
                kind = %kind,
                "{}", self
            ),
        }
    }
}

/// A pending debounced edit was cancelled before it ran.
///
/// # Log Level
/// `trace!` - Very frequent while typing
pub struct EditCancelled {
    pub generation: u64,
}

impl Display for EditCancelled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Pending edit {} cancelled", self.generation)
    }
}

impl StructuredLog for EditCancelled {
    fn log(&self) {
        tracing::trace!(generation = self.generation, "{}", self);
    }
}

/// The session was cleared.
///
/// # Log Level
/// `info!` - User action
pub struct SessionCleared {
    pub generation: u64,
}

impl Display for SessionCleared {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Session cleared at generation {}", self.generation)
    }
}

impl StructuredLog for SessionCleared {
    fn log(&self) {
        tracing::info!(generation = self.generation, "{}", self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_uses_outcome_label() {
        let msg = AttemptCompleted {
            generation: 9,
            outcome: &AttemptOutcome::ZeroValue,
        };
        assert_eq!(msg.to_string(), "Attempt 9 completed: zero value");
    }

    #[test]
    fn test_failed_includes_error() {
        let error = ConversionError::InvalidValue;
        let msg = AttemptFailed {
            generation: 2,
            error: &error,
        };
        assert!(msg.to_string().starts_with("Attempt 2 failed: "));
        msg.log();
    }
}

// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Request coordinator: turns user gestures into ordered conversion attempts.
//!
//! ## Event classes
//!
//! - **Edits** (keystrokes) are debounced. Each edit cancels the previously
//!   scheduled one and schedules its own attempt after the quiescence window,
//!   with staleness suppression enabled.
//! - **Setting changes** (unit, format, precision) run an attempt at once and
//!   never suppress, since the text may be unchanged but the rendering is not.
//! - **Clear** empties everything in one step.
//!
//! ## Ordering
//!
//! Attempts can overlap because acquiring the module suspends. Every event bumps
//! a generation counter and the attempt it issues carries that generation. After
//! acquisition the attempt takes the session lock and proceeds only if its
//! generation is still the latest; otherwise it is discarded unread. Since no
//! step after acquisition suspends, the check and every write it guards happen
//! under one lock hold, so the visible state always belongs to the most
//! recently issued attempt, whichever finishes first.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::attempt::{self, AttemptReport};
use crate::engine::request::{ConversionRequest, FloatingFormat, PrecisionMode, Settings, UnitType};
use crate::engine::state::{ConverterView, SessionState};
use crate::observability::messages::coordinator::{
    AttemptCompleted, AttemptFailed, AttemptIssued, AttemptSuperseded, EditCancelled, SessionCleared,
};
use crate::observability::messages::StructuredLog;
use crate::traits::ModuleSource;

struct CoordinatorInner {
    source: Arc<dyn ModuleSource>,
    state: Mutex<SessionState>,
    settings: Mutex<Settings>,
    generation: AtomicU64,
    debounce: Duration,
    pending_edit: Mutex<Option<CancellationToken>>,
}

/// Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct RequestCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl RequestCoordinator {
    pub fn new(source: Arc<dyn ModuleSource>, settings: Settings, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                source,
                state: Mutex::new(SessionState::default()),
                settings: Mutex::new(settings),
                generation: AtomicU64::new(0),
                debounce,
                pending_edit: Mutex::new(None),
            }),
        }
    }

    pub async fn view(&self) -> ConverterView {
        self.inner.state.lock().await.view()
    }

    pub async fn settings(&self) -> Settings {
        *self.inner.settings.lock().await
    }

    pub fn current_generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Claim a new generation, invalidating every attempt issued before it.
    async fn issue(&self) -> u64 {
        if let Some(pending) = self.inner.pending_edit.lock().await.take() {
            pending.cancel();
        }
        self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == generation
    }

    /// Record a keystroke and schedule a debounced attempt for it.
    ///
    /// The input text updates immediately. The returned task resolves once the
    /// attempt has run or been cancelled by a newer event.
    pub async fn edit(&self, text: impl Into<String>) -> JoinHandle<Option<AttemptReport>> {
        let text = text.into();
        let generation = self.issue().await;
        {
            let mut state = self.inner.state.lock().await;
            if self.is_latest(generation) {
                state.input_text = text.clone();
            }
        }

        let request = ConversionRequest::new(text, &*self.inner.settings.lock().await, true);
        let token = CancellationToken::new();
        *self.inner.pending_edit.lock().await = Some(token.clone());

        let coordinator = self.clone();
        let debounce = self.inner.debounce;
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    EditCancelled { generation }.log();
                    None
                }
                _ = tokio::time::sleep(debounce) => {
                    Some(coordinator.run_attempt(request, generation, "edit").await)
                }
            }
        })
    }

    pub async fn set_unit(&self, unit: UnitType) -> AttemptReport {
        self.inner.settings.lock().await.unit = unit;
        self.reconvert().await
    }

    pub async fn set_format(&self, format: FloatingFormat) -> AttemptReport {
        self.inner.settings.lock().await.format = format;
        self.reconvert().await
    }

    pub async fn set_precision_mode(&self, mode: PrecisionMode) -> AttemptReport {
        self.inner.settings.lock().await.precision_mode = mode;
        self.reconvert().await
    }

    /// Move the precision slider without converting, as while dragging.
    pub async fn move_precision_slider(&self, value: i32) {
        self.inner.settings.lock().await.slider_value = value;
    }

    /// Release the precision slider at `value` and convert with it.
    pub async fn commit_precision_slider(&self, value: i32) -> AttemptReport {
        self.inner.settings.lock().await.slider_value = value;
        self.reconvert().await
    }

    /// Re-run the current input under the current settings.
    async fn reconvert(&self) -> AttemptReport {
        let input = self.inner.state.lock().await.input_text.clone();
        let settings = self.settings().await;
        self.convert(ConversionRequest::new(input, &settings, false)).await
    }

    /// Issue one attempt now, bypassing the debounce.
    pub async fn convert(&self, request: ConversionRequest) -> AttemptReport {
        let generation = self.issue().await;
        self.run_attempt(request, generation, "convert").await
    }

    /// Empty input, message, outputs and previous-input cache.
    ///
    /// Any attempt still in flight is superseded and will not write afterwards.
    pub async fn clear(&self) {
        let generation = self.issue().await;
        self.inner.state.lock().await.reset();
        SessionCleared { generation }.log();
    }

    async fn run_attempt(
        &self,
        request: ConversionRequest,
        generation: u64,
        trigger: &str,
    ) -> AttemptReport {
        AttemptIssued {
            generation,
            trigger,
            input_len: request.raw_input.len(),
        }
        .log();

        if request.raw_input.is_empty() {
            let mut state = self.inner.state.lock().await;
            if !self.is_latest(generation) {
                return self.superseded(generation);
            }
            state.input_text.clear();
            state.error_message.clear();
            state.previous_input.clear();
            state.clear_outputs();
            return AttemptReport::EmptyInput;
        }

        let acquired = self.inner.source.acquire().await;

        let mut state = self.inner.state.lock().await;
        if !self.is_latest(generation) {
            return self.superseded(generation);
        }
        state.input_text = request.raw_input.clone();
        state.error_message.clear();

        let result = match acquired {
            Ok(mut module) => attempt::execute(module.as_mut(), &request, &mut state),
            Err(error) => Err(error),
        };
        match result {
            Ok(outcome) => {
                AttemptCompleted {
                    generation,
                    outcome: &outcome,
                }
                .log();
                AttemptReport::Completed(outcome)
            }
            Err(error) => {
                AttemptFailed {
                    generation,
                    error: &error,
                }
                .log();
                state.fail(&error);
                AttemptReport::Failed(error)
            }
        }
    }

    fn superseded(&self, generation: u64) -> AttemptReport {
        AttemptSuperseded {
            generation,
            latest: self.current_generation(),
        }
        .log();
        AttemptReport::Superseded
    }
}

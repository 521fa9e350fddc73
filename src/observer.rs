//! Observer trait for workflow events.
//!
//! Inject an [`Arc<dyn WorkflowObserver>`] via
//! [`crate::workflow::Workflow::with_observer`] to receive events as the
//! workflow moves through its states.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a progress spinner, a UI re-render, a log sink, or a
//! channel of their own — without the library knowing anything about how the
//! host application communicates. All methods have default no-op
//! implementations so callers only override what they care about.

use crate::collector::ValidationReport;
use crate::error::SubmitError;
use crate::workflow::WorkflowState;
use std::sync::Arc;

/// Called by a [`crate::workflow::Workflow`] as its interaction progresses.
pub trait WorkflowObserver: Send + Sync {
    /// Called on every state transition.
    fn on_state_change(&self, from: WorkflowState, to: WorkflowState) {
        let _ = (from, to);
    }

    /// Called when a submit attempt fails validation (no request was sent).
    fn on_validation_failed(&self, report: &ValidationReport) {
        let _ = report;
    }

    /// Called when a new artifact has been published.
    ///
    /// # Arguments
    /// * `filename` — the artifact's suggested filename
    /// * `bytes`    — artifact size
    fn on_artifact_ready(&self, filename: &str, bytes: usize) {
        let _ = (filename, bytes);
    }

    /// Called when the exchange fails after being sent.
    fn on_submit_error(&self, error: &SubmitError) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need events.
pub struct NoopObserver;

impl WorkflowObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::workflow::Workflow`].
pub type Observer = Arc<dyn WorkflowObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingObserver {
        transitions: AtomicUsize,
        failures: AtomicUsize,
    }

    impl WorkflowObserver for CountingObserver {
        fn on_state_change(&self, _from: WorkflowState, _to: WorkflowState) {
            self.transitions.fetch_add(1, Ordering::SeqCst);
        }

        fn on_submit_error(&self, _error: &SubmitError) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let obs = NoopObserver;
        obs.on_state_change(WorkflowState::Idle, WorkflowState::Collecting);
        obs.on_artifact_ready("output.zip", 1024);
        obs.on_submit_error(&SubmitError::EmptyResponse {
            endpoint: "/blur-eyes".into(),
        });
    }

    #[test]
    fn counting_observer_receives_events() {
        let obs = CountingObserver {
            transitions: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        };
        obs.on_state_change(WorkflowState::Collecting, WorkflowState::Submitting);
        obs.on_state_change(WorkflowState::Submitting, WorkflowState::Failed);
        obs.on_submit_error(&SubmitError::Network {
            endpoint: "/blur-person".into(),
            reason: "connection refused".into(),
        });
        assert_eq!(obs.transitions.load(Ordering::SeqCst), 2);
        assert_eq!(obs.failures.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_observer_works() {
        let obs: Observer = Arc::new(NoopObserver);
        obs.on_state_change(WorkflowState::Idle, WorkflowState::Collecting);
    }
}

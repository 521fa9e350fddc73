//! Workflow: the page-level composition of descriptor, collector, submitter,
//! and artifact handler.
//!
//! ## State machine
//!
//! ```text
//! Idle ──edit──▶ Collecting ──submit (valid)──▶ Submitting ──▶ Ready
//!                    ▲  ▲                           │
//!                    │  └──── submit (invalid) ◀────┤
//!                    └────────── edit ──────────────▶ Failed
//! ```
//!
//! `Ready`/`Failed` return to `Collecting` on any further field edit; the
//! edit clears only the outcome display (last error), never the entered
//! values. There is no `Cancelled` state — an in-flight submission cannot be
//! aborted (known limitation carried over from the service's UI; dropping
//! the `submit` future abandons the request and a later edit returns the
//! workflow to `Collecting`).
//!
//! ## Resource discipline
//!
//! Each workflow owns at most one live [`PreviewHandle`]. A new success
//! publishes the fresh handle and then revokes the superseded one; a failure
//! leaves the previous handle untouched. Dropping the workflow releases the
//! handle, so repeated submissions in a long session never accumulate local
//! resources.

use crate::artifact::{ArtifactHandler, PreviewHandle, ResponseArtifact};
use crate::collector::{FieldValue, InputCollector, ValidationReport};
use crate::config::ClientConfig;
use crate::descriptor::{Operation, RequestDescriptor};
use crate::error::SubmitError;
use crate::observer::Observer;
use crate::submitter::RequestSubmitter;
use serde::Serialize;
use tracing::{debug, info, warn};

/// The workflow's position in its interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// No field has been edited yet.
    Idle,
    /// Fields are being edited; no exchange in flight.
    Collecting,
    /// A submission is in flight; further submits are rejected.
    Submitting,
    /// The last exchange produced an artifact (preview handle live).
    Ready,
    /// The last exchange failed (error retained, previous handle untouched).
    Failed,
}

/// What happened to one submit attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent and the workflow stays in
    /// `Collecting`. The report carries the per-field reasons.
    Invalid(ValidationReport),
    /// A submission is already in flight; this attempt was not sent.
    ///
    /// Also returned after an in-flight [`Workflow::submit`] future was
    /// dropped: the workflow stays `Submitting` until a field edit returns
    /// it to `Collecting` and re-arms submission.
    Rejected,
    /// The exchange completed; the new artifact is published and the
    /// workflow is `Ready`.
    Ready,
    /// The exchange failed; the workflow is `Failed` and
    /// [`Workflow::last_error`] holds the cause.
    Failed,
}

/// One page-level interaction with the anonymization service.
///
/// The only thing that differs between concrete pages is the [`Operation`];
/// everything else — validation, payload assembly, the exchange, artifact
/// lifecycle — is shared.
///
/// # Example
/// ```rust,no_run
/// use obscura_client::{ClientConfig, FieldValue, Operation, SubmitOutcome, Workflow};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut workflow = Workflow::new(Operation::RedactPdf, ClientConfig::default())?;
/// workflow.set_field(
///     "pdf_file",
///     FieldValue::bytes(std::fs::read("contract.pdf")?, "contract.pdf", "application/pdf"),
/// );
/// workflow.set_field("instruction", FieldValue::text("redact all names"));
///
/// match workflow.submit().await {
///     SubmitOutcome::Ready => {
///         let preview = workflow.preview_handle().unwrap();
///         println!("preview at {}", preview.path().display());
///     }
///     SubmitOutcome::Invalid(report) => eprintln!("{:?}", report.issues),
///     SubmitOutcome::Failed => eprintln!("{}", workflow.last_error().unwrap()),
///     SubmitOutcome::Rejected => eprintln!("already submitting"),
/// }
/// # Ok(())
/// # }
/// ```
pub struct Workflow {
    operation: Operation,
    collector: InputCollector,
    submitter: RequestSubmitter,
    handler: ArtifactHandler,
    observer: Option<Observer>,
    state: WorkflowState,
    artifact: Option<ResponseArtifact>,
    handle: Option<PreviewHandle>,
    last_error: Option<SubmitError>,
}

impl Workflow {
    /// Create a workflow for one operation.
    pub fn new(operation: Operation, config: ClientConfig) -> Result<Self, SubmitError> {
        Ok(Self {
            operation,
            collector: InputCollector::new(),
            submitter: RequestSubmitter::new(config)?,
            handler: ArtifactHandler::new(),
            observer: None,
            state: WorkflowState::Idle,
            artifact: None,
            handle: None,
            last_error: None,
        })
    }

    /// Attach an observer for state-change and outcome events.
    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn descriptor(&self) -> &'static RequestDescriptor {
        self.operation.descriptor()
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// The artifact of the most recent successful exchange.
    pub fn artifact(&self) -> Option<&ResponseArtifact> {
        self.artifact.as_ref()
    }

    /// The live preview handle, if any.
    pub fn preview_handle(&self) -> Option<&PreviewHandle> {
        self.handle.as_ref()
    }

    /// The error of the most recent failed exchange, cleared on edit.
    pub fn last_error(&self) -> Option<&SubmitError> {
        self.last_error.as_ref()
    }

    /// Read access to the entered values.
    pub fn collector(&self) -> &InputCollector {
        &self.collector
    }

    /// Set one field. Moves `Idle`, `Ready`, or `Failed` into `Collecting`
    /// and clears the outcome display; the entered values themselves are
    /// never implicitly reset.
    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.collector.set_field(name, value);
        self.enter_collecting();
    }

    /// Clear one field, returning it to "absent".
    pub fn clear_field(&mut self, name: &str) {
        self.collector.clear_field(name);
        self.enter_collecting();
    }

    /// Validate the entered values without submitting.
    pub fn validate(&self) -> ValidationReport {
        self.collector.validate(self.descriptor())
    }

    /// Submit the entered values.
    ///
    /// Exactly one submission may be in flight per workflow; a second
    /// attempt while `Submitting` is rejected, never fired concurrently.
    /// Dropping the returned future abandons the exchange but leaves the
    /// workflow `Submitting`; edit a field to re-arm it.
    /// A success publishes the new preview handle and revokes the superseded
    /// one; a failure leaves the previous handle untouched.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.state == WorkflowState::Submitting {
            warn!(operation = %self.operation, "submit rejected: already in flight");
            return SubmitOutcome::Rejected;
        }

        let report = self.validate();
        if !report.passed() {
            debug!(
                operation = %self.operation,
                issues = report.issues.len(),
                "submit blocked by validation"
            );
            self.transition(WorkflowState::Collecting);
            if let Some(ref obs) = self.observer {
                obs.on_validation_failed(&report);
            }
            return SubmitOutcome::Invalid(report);
        }

        self.transition(WorkflowState::Submitting);
        let result = self
            .submitter
            .submit(self.descriptor(), &self.collector)
            .await;

        match result {
            Ok(artifact) => match self.handler.publish(&artifact).await {
                Ok(new_handle) => {
                    // Revoke the superseded handle immediately after the new
                    // one is live, so exactly one handle exists at any time.
                    if let Some(old) = self.handle.replace(new_handle) {
                        self.handler.revoke(old);
                    }
                    info!(
                        operation = %self.operation,
                        filename = %artifact.suggested_filename,
                        bytes = artifact.len(),
                        "workflow ready"
                    );
                    if let Some(ref obs) = self.observer {
                        obs.on_artifact_ready(&artifact.suggested_filename, artifact.len());
                    }
                    self.artifact = Some(artifact);
                    self.last_error = None;
                    self.transition(WorkflowState::Ready);
                    SubmitOutcome::Ready
                }
                Err(e) => self.fail(e),
            },
            Err(e) => self.fail(e),
        }
    }

    /// Synchronous wrapper around [`Workflow::submit`].
    ///
    /// Creates a temporary tokio runtime internally; prefer the async method
    /// from async contexts.
    pub fn submit_sync(&mut self) -> SubmitOutcome {
        match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(self.submit()),
            Err(e) => self.fail(SubmitError::Internal(format!(
                "Failed to create tokio runtime: {e}"
            ))),
        }
    }

    /// Explicitly release the live preview handle, if any.
    ///
    /// Dropping the workflow has the same effect.
    pub fn revoke_preview(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.handler.revoke(handle);
        }
    }

    /// Save the current artifact to an explicit path (the download action).
    pub async fn save_artifact_to(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), SubmitError> {
        let artifact = self.artifact.as_ref().ok_or_else(|| {
            SubmitError::Internal("no artifact to save; workflow has not reached Ready".into())
        })?;
        self.handler.save_to(artifact, path).await
    }

    fn fail(&mut self, error: SubmitError) -> SubmitOutcome {
        warn!(operation = %self.operation, %error, "workflow failed");
        if let Some(ref obs) = self.observer {
            obs.on_submit_error(&error);
        }
        self.last_error = Some(error);
        self.transition(WorkflowState::Failed);
        SubmitOutcome::Failed
    }

    fn enter_collecting(&mut self) {
        if self.state != WorkflowState::Collecting {
            self.last_error = None;
            self.transition(WorkflowState::Collecting);
        }
    }

    fn transition(&mut self, to: WorkflowState) {
        let from = self.state;
        if from != to {
            debug!(operation = %self.operation, ?from, ?to, "state transition");
            self.state = to;
            if let Some(ref obs) = self.observer {
                obs.on_state_change(from, to);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(op: Operation) -> Workflow {
        Workflow::new(op, ClientConfig::default()).unwrap()
    }

    #[test]
    fn starts_idle() {
        assert_eq!(workflow(Operation::RedactPdf).state(), WorkflowState::Idle);
    }

    #[test]
    fn first_edit_enters_collecting() {
        let mut w = workflow(Operation::RedactPdf);
        w.set_field("instruction", FieldValue::text("redact all names"));
        assert_eq!(w.state(), WorkflowState::Collecting);
    }

    #[tokio::test]
    async fn invalid_submit_stays_collecting_and_sends_nothing() {
        // The default config points at localhost:5000; if validation let the
        // request through this would surface as a network error instead of
        // an Invalid outcome.
        let mut w = workflow(Operation::EyesInVideo);
        let outcome = w.submit().await;
        match outcome {
            SubmitOutcome::Invalid(report) => {
                assert_eq!(report.issues[0].to_string(), "file or link required");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert_eq!(w.state(), WorkflowState::Collecting);
        assert!(w.last_error().is_none());
        assert!(w.preview_handle().is_none());
    }

    #[tokio::test]
    async fn edits_survive_an_invalid_submit() {
        let mut w = workflow(Operation::EyesInVideo);
        w.set_field("output_filename", FieldValue::text("clip.mp4"));
        let _ = w.submit().await;
        assert!(w.collector().is_present("output_filename"));
    }

    #[test]
    fn revoke_preview_without_handle_is_a_noop() {
        let mut w = workflow(Operation::FacesInPictures);
        w.revoke_preview();
        assert!(w.preview_handle().is_none());
    }

    #[tokio::test]
    async fn save_without_artifact_errors() {
        let w = workflow(Operation::RedactPdf);
        let err = w.save_artifact_to("/tmp/never-written.pdf").await;
        assert!(matches!(err, Err(SubmitError::Internal(_))));
    }
}

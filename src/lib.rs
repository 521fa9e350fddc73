//! # obscura-client
//!
//! Client for the Obscura media-anonymization service: blur eyes or faces in
//! pictures and video, blur a specific person, redact PDFs.
//!
//! ## Why this crate?
//!
//! Every operation the service offers is the same interaction wearing a
//! different form: collect a handful of typed inputs, POST them as one
//! multipart request, and turn the binary reply into something the user can
//! preview and download. Writing that exchange once per operation produces
//! seven near-identical copies of the same control flow. This crate collapses
//! the redundancy into a single descriptor-driven [`Workflow`]; the only
//! thing that differs per operation is a row in a static table.
//!
//! ## Workflow Overview
//!
//! ```text
//! Operation (descriptor table row)
//!  │
//!  ├─ 1. Collect   InputCollector holds the typed field values
//!  ├─ 2. Validate  required fields + file-or-link alternatives, no network
//!  ├─ 3. Submit    one multipart POST, no retries (transforms are expensive)
//!  ├─ 4. Publish   artifact → TempDir-backed preview handle (one live max)
//!  └─ 5. Download  atomic save under the suggested filename
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use obscura_client::{ClientConfig, FieldValue, Operation, SubmitOutcome, Workflow};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("http://localhost:5000")
//!         .build()?;
//!
//!     let mut workflow = Workflow::new(Operation::RedactPdf, config)?;
//!     workflow.set_field(
//!         "pdf_file",
//!         FieldValue::bytes(std::fs::read("contract.pdf")?, "contract.pdf", "application/pdf"),
//!     );
//!     workflow.set_field("instruction", FieldValue::text("redact all names"));
//!
//!     if let SubmitOutcome::Ready = workflow.submit().await {
//!         workflow.save_artifact_to("redacted.pdf").await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `obscura` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! obscura-client = { version = "0.1", default-features = false }
//! ```
//!
//! ## Guarantees
//!
//! * Invalid input never reaches the network — validation returns a
//!   structured report, not an error.
//! * Absent optional fields are omitted from the payload entirely, never
//!   sent as empty placeholders.
//! * At most one submission is in flight and at most one preview handle is
//!   live per workflow instance; superseded handles are revoked eagerly and
//!   the rest on drop.
//! * No automatic retries: the backend transforms are non-idempotent and
//!   expensive, so retry policy stays with the caller.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod artifact;
pub mod collector;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod observer;
pub mod submitter;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use artifact::{ArtifactHandler, PreviewHandle, ResponseArtifact};
pub use collector::{FieldValue, InputCollector, ValidationReport};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use descriptor::{FieldDescriptor, FieldKind, Operation, Presence, RequestDescriptor};
pub use error::{ErrorCategory, SubmitError, ValidationIssue};
pub use observer::{NoopObserver, Observer, WorkflowObserver};
pub use submitter::RequestSubmitter;
pub use workflow::{SubmitOutcome, Workflow, WorkflowState};

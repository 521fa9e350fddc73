//! Error types for the obscura-client library.
//!
//! Two distinct types reflect two distinct failure modes:
//!
//! * [`SubmitError`] — the request could not be completed: the multipart
//!   exchange never happened, failed on the wire, was rejected by the server,
//!   or produced a response body that cannot be treated as an artifact.
//!   Returned as `Err(SubmitError)` from [`crate::submitter::RequestSubmitter`].
//!
//! * [`ValidationIssue`] — a field-level problem detected *before* any network
//!   I/O. These are never raised as errors; they are collected into a
//!   [`crate::collector::ValidationReport`] so callers can render inline
//!   feedback next to the offending fields instead of catching exceptions.
//!
//! The separation keeps the promise that invalid input never reaches the
//! network: a submission that fails validation produces a report, not an
//! error, and the workflow stays in its collecting state.

use thiserror::Error;

/// All errors produced while submitting a request or handling its artifact.
#[derive(Debug, Error)]
pub enum SubmitError {
    // ── Transport errors ─────────────────────────────────────────────────
    /// The request could not be sent or no response was received.
    #[error("Network error calling '{endpoint}': {reason}\nCheck the service is reachable and the base URL is correct.")]
    Network { endpoint: String, reason: String },

    /// The exchange exceeded the configured request timeout.
    ///
    /// Media transforms are slow; raise the timeout in
    /// [`crate::config::ClientConfig`] before assuming the service is down.
    #[error("Request to '{endpoint}' timed out after {secs}s")]
    Timeout { endpoint: String, secs: u64 },

    // ── Server errors ────────────────────────────────────────────────────
    /// The server replied with a non-2xx status. Absence of a 2xx status is
    /// the service's sole failure signal; `message` carries the body when it
    /// was readable text.
    #[error("Server rejected '{endpoint}' with HTTP {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Server {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },

    // ── Artifact errors ──────────────────────────────────────────────────
    /// The response was 2xx but its body was empty, so there is no artifact
    /// to preview or download.
    #[error("Server returned an empty body for '{endpoint}'; no artifact produced")]
    EmptyResponse { endpoint: String },

    /// Reading the response body failed mid-transfer.
    #[error("Failed to read response body from '{endpoint}': {reason}")]
    BodyRead { endpoint: String, reason: String },

    // ── Local I/O errors ─────────────────────────────────────────────────
    /// An upload file could not be read from disk.
    #[error("Failed to read upload file '{path}': {source}")]
    UploadRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Publishing or saving the artifact to local storage failed.
    #[error("Failed to write artifact '{path}': {source}")]
    ArtifactWrite {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ────────────────────────────────────────────────────
    /// Builder validation failed or the HTTP client could not be constructed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SubmitError {
    /// Coarse category of the failure.
    ///
    /// Local validation never appears here — it is reported through
    /// [`crate::collector::ValidationReport`] before any request is built.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SubmitError::Network { .. } | SubmitError::Timeout { .. } => ErrorCategory::Network,
            SubmitError::Server { .. } => ErrorCategory::Server,
            SubmitError::EmptyResponse { .. } | SubmitError::BodyRead { .. } => {
                ErrorCategory::Artifact
            }
            _ => ErrorCategory::Other,
        }
    }

    /// The HTTP status carried by a [`SubmitError::Server`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            SubmitError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Coarse failure category surfaced to the user by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request never reached the server or no response arrived.
    Network,
    /// Server answered with a non-2xx status.
    Server,
    /// Response arrived but could not be treated as a binary artifact.
    Artifact,
    /// Local configuration or I/O problem.
    Other,
}

/// A single field-level validation problem.
///
/// Collected into a [`crate::collector::ValidationReport`]; never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum ValidationIssue {
    /// A required field has no value.
    #[error("Field '{field}' is required")]
    MissingRequired { field: String },

    /// Every member of an alternative group (e.g. file-or-link) is absent.
    #[error("{} required", .fields.join(" or "))]
    MissingAlternative { fields: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_display_with_message() {
        let e = SubmitError::Server {
            endpoint: "/redact-pdf".into(),
            status: 500,
            message: Some("spaCy model missing".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("500"), "got: {msg}");
        assert!(msg.contains("spaCy model missing"));
        assert_eq!(e.status(), Some(500));
        assert_eq!(e.category(), ErrorCategory::Server);
    }

    #[test]
    fn server_error_display_without_message() {
        let e = SubmitError::Server {
            endpoint: "/blur-eyes".into(),
            status: 404,
            message: None,
        };
        assert!(e.to_string().contains("HTTP 404"));
    }

    #[test]
    fn timeout_is_network_category() {
        let e = SubmitError::Timeout {
            endpoint: "/blur-person".into(),
            secs: 300,
        };
        assert_eq!(e.category(), ErrorCategory::Network);
        assert_eq!(e.status(), None);
    }

    #[test]
    fn empty_response_is_artifact_category() {
        let e = SubmitError::EmptyResponse {
            endpoint: "/blur-eyes".into(),
        };
        assert_eq!(e.category(), ErrorCategory::Artifact);
    }

    #[test]
    fn alternative_issue_display() {
        let issue = ValidationIssue::MissingAlternative {
            fields: vec!["file".into(), "link".into()],
        };
        assert_eq!(issue.to_string(), "file or link required");
    }
}

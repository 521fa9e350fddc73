//! Input collection: hold and validate user-entered values for one request.
//!
//! The collector is deliberately network-free — it owns an in-memory map from
//! wire field name to current value and can judge, against a
//! [`RequestDescriptor`], whether that map is submittable. Values persist
//! across submissions; only an explicit [`InputCollector::set_field`] or
//! [`InputCollector::clear_field`] changes them, so a failed exchange never
//! costs the user their selections.
//!
//! Validation returns a structured [`ValidationReport`] instead of erroring:
//! the caller renders the per-field reasons inline and decides what to do.
//! An empty string set on a text field counts as *present* — the service
//! accepts (and expects) an empty `output_filename` part.

use crate::descriptor::{Presence, RequestDescriptor};
use crate::error::{SubmitError, ValidationIssue};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// The current value of one field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Binary content to upload as a file part.
    Bytes {
        data: Vec<u8>,
        /// Filename attached to the multipart part.
        file_name: String,
        /// MIME type of the part, e.g. `application/pdf`.
        content_type: String,
    },
    /// Text content (link, instruction, output name).
    Text(String),
}

impl FieldValue {
    /// Convenience constructor for text values.
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// Convenience constructor for binary values.
    pub fn bytes(
        data: Vec<u8>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
    ) -> Self {
        FieldValue::Bytes {
            data,
            file_name: file_name.into(),
            content_type: content_type.into(),
        }
    }

    /// Read a binary value from disk, taking the part filename from the path.
    pub async fn from_file(
        path: impl AsRef<Path>,
        content_type: impl Into<String>,
    ) -> Result<Self, SubmitError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| SubmitError::UploadRead {
                path: path.to_path_buf(),
                source: e,
            })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        Ok(FieldValue::bytes(data, file_name, content_type))
    }
}

/// Outcome of validating a collector against a descriptor.
///
/// Passing means every required field has a value and at least one member of
/// the descriptor's alternative group (if it has one) is present.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True when the collector state is submittable.
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Holds the user-entered values for one workflow instance.
///
/// Owned exclusively by the active [`crate::workflow::Workflow`]; there is no
/// shared or ambient form state.
#[derive(Debug, Clone, Default)]
pub struct InputCollector {
    values: HashMap<String, FieldValue>,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the value of one field.
    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.values.insert(name.into(), value);
    }

    /// Remove a field's value, returning it to "absent".
    pub fn clear_field(&mut self, name: &str) {
        self.values.remove(name);
    }

    /// Current value of a field, if present.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Whether a field currently has a value. An explicitly set empty string
    /// is present; a never-set or cleared field is not.
    pub fn is_present(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of fields with a value.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check this collector against a descriptor.
    ///
    /// Never errors — missing-field reasons come back in the report so the
    /// caller can show them next to the fields. The alternative-group rule
    /// accepts any one member being present and fails only when the whole
    /// group is absent.
    pub fn validate(&self, descriptor: &RequestDescriptor) -> ValidationReport {
        let mut issues = Vec::new();

        for field in &descriptor.fields {
            if field.presence == Presence::Required && !self.is_present(field.name) {
                issues.push(ValidationIssue::MissingRequired {
                    field: field.name.to_string(),
                });
            }
        }

        let alternatives = descriptor.alternative_fields();
        if !alternatives.is_empty() && !alternatives.iter().any(|f| self.is_present(f.name)) {
            issues.push(ValidationIssue::MissingAlternative {
                fields: alternatives.iter().map(|f| f.name.to_string()).collect(),
            });
        }

        ValidationReport { issues }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Operation;

    #[test]
    fn empty_collector_fails_required_fields() {
        let collector = InputCollector::new();
        let report = collector.validate(Operation::RedactPdf.descriptor());
        assert!(!report.passed());
        assert!(report.issues.iter().any(|i| matches!(
            i,
            ValidationIssue::MissingRequired { field } if field == "pdf_file"
        )));
    }

    #[test]
    fn required_fields_present_passes() {
        let mut collector = InputCollector::new();
        collector.set_field(
            "pdf_file",
            FieldValue::bytes(vec![0x25, 0x50, 0x44, 0x46], "doc.pdf", "application/pdf"),
        );
        let report = collector.validate(Operation::RedactPdf.descriptor());
        assert!(report.passed(), "issues: {:?}", report.issues);
    }

    #[test]
    fn file_or_link_both_absent_fails() {
        let collector = InputCollector::new();
        let report = collector.validate(Operation::EyesInVideo.descriptor());
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].to_string(), "file or link required");
    }

    #[test]
    fn link_alone_satisfies_the_alternative_group() {
        let mut collector = InputCollector::new();
        collector.set_field("link", FieldValue::text("https://example.com/clip.mp4"));
        assert!(collector.validate(Operation::EyesInVideo.descriptor()).passed());
    }

    #[test]
    fn file_alone_satisfies_the_alternative_group() {
        let mut collector = InputCollector::new();
        collector.set_field("file", FieldValue::bytes(vec![1, 2, 3], "clip.mp4", "video/mp4"));
        assert!(collector.validate(Operation::EyesInVideo.descriptor()).passed());
    }

    #[test]
    fn specific_person_video_needs_reference_even_with_link() {
        let mut collector = InputCollector::new();
        collector.set_field("link", FieldValue::text("https://example.com/clip.mp4"));
        let report = collector.validate(Operation::SpecificFacesInVideo.descriptor());
        assert!(report.issues.iter().any(|i| matches!(
            i,
            ValidationIssue::MissingRequired { field } if field == "reference_file"
        )));
    }

    #[test]
    fn empty_string_counts_as_present() {
        let mut collector = InputCollector::new();
        collector.set_field("output_filename", FieldValue::text(""));
        assert!(collector.is_present("output_filename"));
    }

    #[tokio::test]
    async fn from_file_carries_name_and_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holiday.zip");
        std::fs::write(&path, [0x50, 0x4b, 0x03, 0x04]).unwrap();

        let value = FieldValue::from_file(&path, "application/zip").await.unwrap();
        match value {
            FieldValue::Bytes {
                data,
                file_name,
                content_type,
            } => {
                assert_eq!(data, vec![0x50, 0x4b, 0x03, 0x04]);
                assert_eq!(file_name, "holiday.zip");
                assert_eq!(content_type, "application/zip");
            }
            other => panic!("expected Bytes, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn from_file_reports_missing_uploads() {
        let err = FieldValue::from_file("/definitely/not/here.zip", "application/zip").await;
        assert!(matches!(err, Err(SubmitError::UploadRead { .. })));
    }

    #[test]
    fn clear_field_returns_to_absent() {
        let mut collector = InputCollector::new();
        collector.set_field("link", FieldValue::text("https://example.com/v.mp4"));
        collector.clear_field("link");
        assert!(!collector.is_present("link"));
        assert!(!collector.validate(Operation::EyesInVideo.descriptor()).passed());
    }
}

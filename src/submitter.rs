//! Request submission: turn collector state into one multipart POST.
//!
//! ## Payload rules
//!
//! Only fields with a present value become multipart parts — an absent
//! optional field is omitted entirely, never sent as an empty placeholder.
//! When both members of a file-or-link alternative group carry a value, the
//! uploaded file wins and the link is dropped from the payload (with a
//! warning), so the server never has to guess which source to use.
//!
//! Payload assembly is a pure step ([`build_parts`]) separated from the
//! network exchange so the omission and precedence rules are unit-testable
//! without a server.
//!
//! ## No retries
//!
//! The backend operations are non-idempotent, expensive media transforms.
//! A silently retried request could duplicate minutes of processing, so any
//! retry policy belongs to the caller, never to this component.

use crate::artifact::ResponseArtifact;
use crate::collector::{FieldValue, InputCollector};
use crate::config::ClientConfig;
use crate::descriptor::{FieldKind, Presence, RequestDescriptor};
use crate::error::SubmitError;
use reqwest::multipart;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One assembled multipart part, before it is handed to the HTTP client.
#[derive(Debug, Clone)]
pub enum SubmissionPart {
    Text {
        name: &'static str,
        value: String,
    },
    Bytes {
        name: &'static str,
        data: Vec<u8>,
        file_name: String,
        content_type: String,
    },
}

impl SubmissionPart {
    /// Wire name of the part.
    pub fn name(&self) -> &str {
        match self {
            SubmissionPart::Text { name, .. } => name,
            SubmissionPart::Bytes { name, .. } => name,
        }
    }
}

/// Assemble the multipart payload from collector state, filtered through the
/// descriptor's fields.
///
/// Fields without a value produce no part. If both an uploaded file and a
/// link are present in the same alternative group, the file takes precedence
/// and the link is omitted.
pub fn build_parts(
    descriptor: &RequestDescriptor,
    collector: &InputCollector,
) -> Vec<SubmissionPart> {
    // File-over-link precedence: resolved before the field walk so the
    // emitted payload is deterministic regardless of field order.
    let alternative_file_present = descriptor
        .fields
        .iter()
        .filter(|f| f.presence == Presence::Alternative && f.is_binary())
        .any(|f| collector.is_present(f.name));

    let mut parts = Vec::new();
    for field in &descriptor.fields {
        let Some(value) = collector.get(field.name) else {
            continue;
        };

        if field.kind == FieldKind::TextLink
            && field.presence == Presence::Alternative
            && alternative_file_present
        {
            warn!(
                field = field.name,
                "both file and link provided; uploading the file and dropping the link"
            );
            continue;
        }

        match value {
            FieldValue::Text(s) => parts.push(SubmissionPart::Text {
                name: field.name,
                value: s.clone(),
            }),
            FieldValue::Bytes {
                data,
                file_name,
                content_type,
            } => parts.push(SubmissionPart::Bytes {
                name: field.name,
                data: data.clone(),
                file_name: file_name.clone(),
                content_type: content_type.clone(),
            }),
        }
    }
    parts
}

/// Choose the artifact filename: a non-blank user-entered output name always
/// wins, otherwise the descriptor's default applies.
pub fn suggested_filename(descriptor: &RequestDescriptor, collector: &InputCollector) -> String {
    let user_name = descriptor
        .fields
        .iter()
        .find(|f| f.kind == FieldKind::TextOutputName)
        .and_then(|f| collector.get(f.name))
        .and_then(|v| match v {
            FieldValue::Text(s) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        });
    user_name.unwrap_or_else(|| descriptor.default_output_name.to_string())
}

/// Performs the multipart exchange with the anonymization service.
///
/// One instance wraps one `reqwest::Client` and can serve any number of
/// submissions; construction is the only fallible setup step.
#[derive(Debug, Clone)]
pub struct RequestSubmitter {
    client: reqwest::Client,
    config: ClientConfig,
}

impl RequestSubmitter {
    /// Build a submitter from a validated [`ClientConfig`].
    pub fn new(config: ClientConfig) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| SubmitError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// The configuration this submitter was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Submit the collector state to the descriptor's endpoint and wrap the
    /// binary reply into a [`ResponseArtifact`].
    ///
    /// The caller is responsible for validating the collector first; this
    /// method faithfully sends whatever is present.
    pub async fn submit(
        &self,
        descriptor: &RequestDescriptor,
        collector: &InputCollector,
    ) -> Result<ResponseArtifact, SubmitError> {
        let endpoint = descriptor.endpoint_path;
        let url = self.config.endpoint_url(endpoint);
        let start = Instant::now();

        let parts = build_parts(descriptor, collector);
        debug!(
            endpoint,
            parts = parts.len(),
            "assembled multipart payload"
        );

        let mut form = multipart::Form::new();
        for part in parts {
            form = match part {
                SubmissionPart::Text { name, value } => form.text(name, value),
                SubmissionPart::Bytes {
                    name,
                    data,
                    file_name,
                    content_type,
                } => {
                    let p = multipart::Part::bytes(data)
                        .file_name(file_name)
                        .mime_str(&content_type)
                        .map_err(|e| {
                            SubmitError::Internal(format!("bad content type for '{name}': {e}"))
                        })?;
                    form.part(name, p)
                }
            };
        }

        info!("POST {url}");
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SubmitError::Timeout {
                        endpoint: endpoint.to_string(),
                        secs: self.config.request_timeout_secs,
                    }
                } else {
                    SubmitError::Network {
                        endpoint: endpoint.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // The body of a failure is occasionally readable text worth
            // surfacing; anything else is discarded.
            let message = response
                .text()
                .await
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
            return Err(SubmitError::Server {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = response.bytes().await.map_err(|e| SubmitError::BodyRead {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if data.is_empty() {
            return Err(SubmitError::EmptyResponse {
                endpoint: endpoint.to_string(),
            });
        }

        let artifact = ResponseArtifact {
            data: data.to_vec(),
            content_type,
            suggested_filename: suggested_filename(descriptor, collector),
        };
        info!(
            endpoint,
            bytes = artifact.data.len(),
            content_type = %artifact.content_type,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "artifact received"
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Operation;

    fn pdf_collector(output_name: &str) -> InputCollector {
        let mut c = InputCollector::new();
        c.set_field(
            "pdf_file",
            FieldValue::bytes(b"%PDF-1.7".to_vec(), "in.pdf", "application/pdf"),
        );
        c.set_field("instruction", FieldValue::text("redact all names"));
        c.set_field("output_filename", FieldValue::text(output_name));
        c
    }

    #[test]
    fn absent_optional_fields_produce_no_parts() {
        let mut c = InputCollector::new();
        c.set_field(
            "pdf_file",
            FieldValue::bytes(b"%PDF".to_vec(), "in.pdf", "application/pdf"),
        );
        let parts = build_parts(Operation::RedactPdf.descriptor(), &c);
        let names: Vec<_> = parts.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["pdf_file"]);
    }

    #[test]
    fn set_empty_output_name_is_sent_as_empty_part() {
        let parts = build_parts(Operation::RedactPdf.descriptor(), &pdf_collector(""));
        let names: Vec<_> = parts.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["pdf_file", "instruction", "output_filename"]);
        assert!(parts.iter().any(|p| matches!(
            p,
            SubmissionPart::Text { name: "output_filename", value } if value.is_empty()
        )));
    }

    #[test]
    fn file_takes_precedence_over_link() {
        let mut c = InputCollector::new();
        c.set_field("file", FieldValue::bytes(vec![1, 2], "clip.mp4", "video/mp4"));
        c.set_field("link", FieldValue::text("https://example.com/clip.mp4"));
        let parts = build_parts(Operation::EyesInVideo.descriptor(), &c);
        let names: Vec<_> = parts.iter().map(|p| p.name()).collect();
        assert!(names.contains(&"file"));
        assert!(!names.contains(&"link"));
    }

    #[test]
    fn link_alone_is_sent() {
        let mut c = InputCollector::new();
        c.set_field("link", FieldValue::text("https://example.com/clip.mp4"));
        let parts = build_parts(Operation::EyesInVideo.descriptor(), &c);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].name(), "link");
    }

    #[test]
    fn blank_output_name_falls_back_to_default() {
        let d = Operation::RedactPdf.descriptor();
        assert_eq!(suggested_filename(d, &pdf_collector("")), "redacted_output.pdf");
        assert_eq!(suggested_filename(d, &pdf_collector("   ")), "redacted_output.pdf");
    }

    #[test]
    fn user_output_name_overrides_default() {
        let d = Operation::RedactPdf.descriptor();
        assert_eq!(suggested_filename(d, &pdf_collector("clean.pdf")), "clean.pdf");
    }

    #[test]
    fn absent_output_name_also_falls_back_to_default() {
        let mut c = InputCollector::new();
        c.set_field(
            "zip_file",
            FieldValue::bytes(vec![0x50, 0x4b], "pics.zip", "application/zip"),
        );
        let d = Operation::EyesInPictures.descriptor();
        assert_eq!(suggested_filename(d, &c), "output.zip");
    }

    #[test]
    fn submitter_builds_from_default_config() {
        let s = RequestSubmitter::new(ClientConfig::default()).unwrap();
        assert_eq!(s.config().base_url, "http://localhost:5000");
    }
}

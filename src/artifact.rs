//! Artifact handling: preview, revoke, and save the binary response.
//!
//! ## Why publish to a temp file?
//!
//! Preview surfaces (image viewers, PDF viewers, media players) want a
//! file-system path, not a byte buffer. Publishing writes the artifact into
//! a `TempDir`-backed file and hands back a [`PreviewHandle`] that owns the
//! directory, so the bytes stay addressable without another network
//! round-trip and cleanup happens automatically when the handle is revoked
//! or dropped — even if the process panics. The single-owner handle
//! discipline (one live handle per workflow) is what keeps a long session of
//! repeated submissions from accumulating orphaned temp files.

use crate::error::SubmitError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// The binary reply of one successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseArtifact {
    /// Raw artifact bytes.
    #[serde(skip)]
    pub data: Vec<u8>,
    /// MIME type declared by the response headers.
    pub content_type: String,
    /// Filename offered on download: the user's output name when non-blank,
    /// else the descriptor's default.
    pub suggested_filename: String,
}

impl ResponseArtifact {
    /// Size of the artifact in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A locally addressable copy of a published artifact.
///
/// The handle owns the backing `TempDir`: dropping or revoking it deletes
/// the on-disk resource. At most one handle should be live per workflow
/// instance at a time.
#[derive(Debug)]
pub struct PreviewHandle {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl PreviewHandle {
    /// Path a preview surface can open.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reduce a user-entered output name to its final path component.
///
/// Output names come straight from a text field; a separator or `..` in one
/// must not place the written file outside the managed directory.
fn artifact_file_name(suggested: &str) -> &str {
    Path::new(suggested)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("artifact")
}

/// Publishes, revokes, and saves response artifacts.
#[derive(Debug, Clone, Default)]
pub struct ArtifactHandler;

impl ArtifactHandler {
    pub fn new() -> Self {
        Self
    }

    /// Publish the artifact as a local preview resource.
    ///
    /// The suggested filename is reduced to its final path component, so the
    /// preview always lives inside the handle's directory and is deleted with
    /// it on revoke or drop.
    pub async fn publish(&self, artifact: &ResponseArtifact) -> Result<PreviewHandle, SubmitError> {
        let temp_dir = TempDir::new().map_err(|e| SubmitError::Internal(format!("tempdir: {e}")))?;
        let path = temp_dir
            .path()
            .join(artifact_file_name(&artifact.suggested_filename));

        tokio::fs::write(&path, &artifact.data)
            .await
            .map_err(|e| SubmitError::ArtifactWrite {
                path: path.clone(),
                source: e,
            })?;

        debug!(path = %path.display(), bytes = artifact.data.len(), "preview published");
        Ok(PreviewHandle {
            path,
            _temp_dir: temp_dir,
        })
    }

    /// Release a preview handle and its on-disk resource.
    ///
    /// Dropping the handle has the same effect; this method exists so the
    /// release point is explicit at the call site.
    pub fn revoke(&self, handle: PreviewHandle) {
        debug!(path = %handle.path.display(), "preview revoked");
        drop(handle);
    }

    /// Save the artifact to an explicit path.
    ///
    /// Uses atomic write (temp file + rename) to prevent partial files.
    pub async fn save_to(
        &self,
        artifact: &ResponseArtifact,
        output_path: impl AsRef<Path>,
    ) -> Result<(), SubmitError> {
        let path = output_path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    SubmitError::ArtifactWrite {
                        path: path.to_path_buf(),
                        source: e,
                    }
                })?;
            }
        }

        let tmp_path = path.with_extension("part");
        tokio::fs::write(&tmp_path, &artifact.data)
            .await
            .map_err(|e| SubmitError::ArtifactWrite {
                path: path.to_path_buf(),
                source: e,
            })?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| SubmitError::ArtifactWrite {
                path: path.to_path_buf(),
                source: e,
            })?;

        info!(path = %path.display(), bytes = artifact.data.len(), "artifact saved");
        Ok(())
    }

    /// Save the artifact into a directory under its suggested filename,
    /// returning the full path written. As with [`ArtifactHandler::publish`],
    /// only the final component of the suggested name is used.
    pub async fn save_in(
        &self,
        artifact: &ResponseArtifact,
        dir: impl AsRef<Path>,
    ) -> Result<PathBuf, SubmitError> {
        let path = dir
            .as_ref()
            .join(artifact_file_name(&artifact.suggested_filename));
        self.save_to(artifact, &path).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> ResponseArtifact {
        ResponseArtifact {
            data: b"%PDF-1.7 fake".to_vec(),
            content_type: "application/pdf".to_string(),
            suggested_filename: "redacted_output.pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn publish_writes_the_bytes_under_the_suggested_name() {
        let handler = ArtifactHandler::new();
        let handle = handler.publish(&artifact()).await.unwrap();

        assert!(handle.path().exists());
        assert_eq!(
            handle.path().file_name().unwrap().to_str().unwrap(),
            "redacted_output.pdf"
        );
        let on_disk = std::fs::read(handle.path()).unwrap();
        assert_eq!(on_disk, b"%PDF-1.7 fake");
    }

    #[tokio::test]
    async fn revoke_removes_the_resource() {
        let handler = ArtifactHandler::new();
        let handle = handler.publish(&artifact()).await.unwrap();
        let path = handle.path().to_path_buf();

        handler.revoke(handle);
        assert!(!path.exists(), "revoked preview still on disk");
    }

    #[tokio::test]
    async fn drop_also_removes_the_resource() {
        let handler = ArtifactHandler::new();
        let path = {
            let handle = handler.publish(&artifact()).await.unwrap();
            handle.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn absolute_output_name_cannot_escape_the_preview_dir() {
        let outside = tempfile::tempdir().unwrap();
        let escape = outside.path().join("escaped.pdf");
        let mut a = artifact();
        a.suggested_filename = escape.to_str().unwrap().to_string();

        let handler = ArtifactHandler::new();
        let handle = handler.publish(&a).await.unwrap();
        assert!(!escape.exists(), "preview landed outside its managed directory");
        assert_eq!(
            handle.path().file_name().unwrap().to_str().unwrap(),
            "escaped.pdf"
        );

        let path = handle.path().to_path_buf();
        handler.revoke(handle);
        assert!(!path.exists(), "revoke must delete the preview resource");
    }

    #[tokio::test]
    async fn publish_ignores_directories_in_the_output_name() {
        let mut a = artifact();
        a.suggested_filename = "nested/dir/../out.pdf".to_string();

        let handle = ArtifactHandler::new().publish(&a).await.unwrap();
        assert!(handle.path().exists());
        assert_eq!(handle.path().file_name().unwrap().to_str().unwrap(), "out.pdf");
    }

    #[test]
    fn degenerate_output_names_fall_back_to_a_generic_name() {
        assert_eq!(artifact_file_name("clean.pdf"), "clean.pdf");
        assert_eq!(artifact_file_name("../clean.pdf"), "clean.pdf");
        assert_eq!(artifact_file_name(".."), "artifact");
        assert_eq!(artifact_file_name("/"), "artifact");
    }

    #[tokio::test]
    async fn save_to_writes_atomically_named_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/out.pdf");

        let handler = ArtifactHandler::new();
        handler.save_to(&artifact(), &target).await.unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.7 fake");
        assert!(!target.with_extension("part").exists());
    }

    #[tokio::test]
    async fn save_in_uses_the_suggested_filename() {
        let dir = tempfile::tempdir().unwrap();
        let handler = ArtifactHandler::new();
        let written = handler.save_in(&artifact(), dir.path()).await.unwrap();
        assert_eq!(
            written.file_name().unwrap().to_str().unwrap(),
            "redacted_output.pdf"
        );
        assert!(written.exists());
    }

    #[tokio::test]
    async fn save_in_cannot_escape_the_target_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = artifact();
        a.suggested_filename = "../escaped.pdf".to_string();

        let written = ArtifactHandler::new().save_in(&a, dir.path()).await.unwrap();
        assert_eq!(written, dir.path().join("escaped.pdf"));
        assert!(!dir.path().parent().unwrap().join("escaped.pdf").exists());
    }
}

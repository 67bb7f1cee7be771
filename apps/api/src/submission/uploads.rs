use std::path::{Path, PathBuf};

use anyhow::Context;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

/// Local directory holding uploaded resumes and portfolios.
#[derive(Debug, Clone)]
pub struct UploadDir {
    dir: PathBuf,
}

impl UploadDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes `bytes` under a generated unique name and returns that name.
    pub async fn save(&self, original_name: &str, bytes: &Bytes) -> Result<String, AppError> {
        let stored = stored_name(original_name);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating upload dir {}", self.dir.display()))?;
        let path = self.dir.join(&stored);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("writing upload {}", path.display()))?;
        info!(file = %stored, bytes = bytes.len(), "Upload stored");
        Ok(stored)
    }

    /// Removes an upload whose record never made it to the store.
    pub async fn discard(&self, stored: &str) {
        let path = self.dir.join(stored);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(file = %stored, error = %e, "Could not remove orphaned upload");
        }
    }
}

/// `<uuid>-<sanitized original>`; anything outside `[A-Za-z0-9._-]` becomes `_`.
fn stored_name(original_name: &str) -> String {
    let base = Path::new(original_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let clean: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let clean = clean.trim_start_matches('.');
    if clean.is_empty() {
        Uuid::new_v4().to_string()
    } else {
        format!("{}-{clean}", Uuid::new_v4())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_name_strips_paths_and_odd_characters() {
        let name = stored_name("../../etc/my resume (final).pdf");
        assert!(name.ends_with("-my_resume__final_.pdf"), "{name}");
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_stored_names_are_unique() {
        assert_ne!(stored_name("cv.pdf"), stored_name("cv.pdf"));
    }

    #[tokio::test]
    async fn test_save_writes_into_dir() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path().join("resume"));
        let stored = uploads.save("cv.txt", &Bytes::from_static(b"hello")).await.unwrap();

        let written = std::fs::read(dir.path().join("resume").join(&stored)).unwrap();
        assert_eq!(written, b"hello");
    }

    #[tokio::test]
    async fn test_discard_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadDir::new(dir.path());
        let stored = uploads.save("cv.txt", &Bytes::from_static(b"hello")).await.unwrap();

        uploads.discard(&stored).await;
        assert!(!dir.path().join(&stored).exists());
        // A second discard only logs.
        uploads.discard(&stored).await;
    }
}

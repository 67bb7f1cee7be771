//! Artifact decoding: turns uploaded or stored documents into prompt text.

use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use super::GatewayError;

/// The work product being scored.
#[derive(Debug, Clone)]
pub enum Artifact {
    /// Already-decoded text.
    Text(String),
    /// Raw uploaded bytes: PDF or UTF-8 text.
    Document { file_name: String, bytes: Bytes },
}

impl Artifact {
    pub fn document(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Artifact::Document {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn decode(&self) -> Result<String, GatewayError> {
        match self {
            Artifact::Text(text) => non_blank(text.clone(), "submitted text"),
            Artifact::Document { file_name, bytes } => decode_document(file_name, bytes.clone()).await,
        }
    }
}

fn is_pdf(file_name: &str, bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF") || file_name.to_ascii_lowercase().ends_with(".pdf")
}

fn non_blank(text: String, what: &str) -> Result<String, GatewayError> {
    if text.trim().is_empty() {
        return Err(GatewayError::ArtifactUnreadable(format!("{what} contains no readable text")));
    }
    Ok(text)
}

/// Decodes a PDF (via `pdf-extract`) or a UTF-8 text document.
pub async fn decode_document(file_name: &str, bytes: Bytes) -> Result<String, GatewayError> {
    if bytes.is_empty() {
        return Err(GatewayError::ArtifactUnreadable(format!("'{file_name}' is empty")));
    }

    let text = if is_pdf(file_name, &bytes) {
        // Extraction is CPU-bound and can panic on malformed input; a panic
        // surfaces as a JoinError on the blocking task.
        let owned = bytes.clone();
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&owned))
            .await
            .map_err(|_| {
                GatewayError::ArtifactUnreadable(format!("'{file_name}' is not a readable PDF"))
            })?
            .map_err(|e| {
                GatewayError::ArtifactUnreadable(format!("'{file_name}' is not a readable PDF: {e:?}"))
            })?
    } else {
        String::from_utf8(bytes.to_vec()).map_err(|_| {
            GatewayError::ArtifactUnreadable(format!("'{file_name}' is neither PDF nor UTF-8 text"))
        })?
    };

    debug!(file_name, chars = text.len(), "Decoded document");
    non_blank(text, &format!("'{file_name}'"))
}

/// Reads and decodes a document stored on disk, such as an assignment brief.
pub async fn read_document(path: &Path) -> Result<String, GatewayError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        GatewayError::ArtifactUnreadable(format!("cannot read '{}': {e}", path.display()))
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    decode_document(&file_name, Bytes::from(bytes)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_plain_text_document_decodes() {
        let artifact = Artifact::document("resume.txt", "Rust engineer, 6 years".as_bytes().to_vec());
        assert_eq!(artifact.decode().await.unwrap(), "Rust engineer, 6 years");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_unreadable() {
        let artifact = Artifact::document("resume.txt", vec![0xff, 0xfe, 0x00, 0x81]);
        let err = artifact.decode().await.unwrap_err();
        assert!(matches!(err, GatewayError::ArtifactUnreadable(_)));
    }

    #[tokio::test]
    async fn test_broken_pdf_is_unreadable() {
        let artifact = Artifact::document("resume.pdf", b"%PDF-1.4 not really a pdf".to_vec());
        let err = artifact.decode().await.unwrap_err();
        assert!(matches!(err, GatewayError::ArtifactUnreadable(_)));
    }

    #[tokio::test]
    async fn test_empty_and_blank_inputs_are_unreadable() {
        let empty = Artifact::document("resume.txt", Vec::new());
        assert!(matches!(
            empty.decode().await,
            Err(GatewayError::ArtifactUnreadable(_))
        ));

        let blank = Artifact::Text("   \n".to_string());
        assert!(matches!(
            blank.decode().await,
            Err(GatewayError::ArtifactUnreadable(_))
        ));
    }

    #[tokio::test]
    async fn test_read_document_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(&dir.path().join("nope.pdf")).await.unwrap_err();
        assert!(matches!(err, GatewayError::ArtifactUnreadable(_)));
    }

    #[tokio::test]
    async fn test_read_document_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief.md");
        std::fs::write(&path, "Build a todo app").unwrap();
        assert_eq!(read_document(&path).await.unwrap(), "Build a todo app");
    }
}

//! File attachments encoded as base64 data URLs

use base64::{Engine, engine::general_purpose::STANDARD};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Largest file accepted as an attachment (10 MiB)
pub const MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// A file picked for sending alongside a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub path: PathBuf,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Build an attachment from in-memory bytes, guessing the mime type from
    /// the path's extension
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        let path = path.into();
        let mime_type = mime_from_extension(&path).to_string();
        Self {
            path,
            mime_type,
            bytes,
        }
    }

    /// Read an attachment from disk
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(Error::InvalidConfig(format!(
                "{} is not a regular file",
                path.display()
            )));
        }
        if metadata.len() > MAX_ATTACHMENT_BYTES {
            return Err(Error::InvalidConfig(format!(
                "{} is {} bytes, the limit is {}",
                path.display(),
                metadata.len(),
                MAX_ATTACHMENT_BYTES
            )));
        }
        let bytes = tokio::fs::read(path).await?;
        tracing::debug!("Loaded attachment {} ({} bytes)", path.display(), bytes.len());
        Ok(Self::from_bytes(path, bytes))
    }

    /// File name for display
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// `data:<mime>;base64,<payload>`
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// Encode every attachment as a data URL, preserving order
pub fn encode_all(attachments: &[Attachment]) -> Vec<String> {
    attachments.iter().map(Attachment::to_data_url).collect()
}

/// Guess a mime type from a file extension
pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("json") => "application/json",
        Some("txt") | Some("log") => "text/plain",
        Some("md") => "text/markdown",
        Some("csv") => "text/csv",
        Some("html") | Some("htm") => "text/html",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        let a = Attachment::from_bytes("notes.txt", b"hi".to_vec());
        assert_eq!(a.mime_type, "text/plain");
        assert_eq!(a.to_data_url(), "data:text/plain;base64,aGk=");
        assert_eq!(a.file_name(), "notes.txt");
    }

    #[test]
    fn test_mime_is_case_insensitive() {
        assert_eq!(mime_from_extension(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("avatar.webp")), "image/webp");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(
            mime_from_extension(Path::new("archive.xyz")),
            "application/octet-stream"
        );
        assert_eq!(mime_from_extension(Path::new("Makefile")), "application/octet-stream");
    }

    #[test]
    fn test_encode_all_keeps_order() {
        let files = vec![
            Attachment::from_bytes("a.txt", b"a".to_vec()),
            Attachment::from_bytes("b.png", vec![0x89, 0x50]),
        ];
        let encoded = encode_all(&files);
        assert_eq!(encoded.len(), 2);
        assert!(encoded[0].starts_with("data:text/plain;base64,"));
        assert!(encoded[1].starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = Attachment::load("/definitely/not/here.txt").await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_load_rejects_directory() {
        let dir = std::env::temp_dir();
        let err = Attachment::load(&dir).await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}

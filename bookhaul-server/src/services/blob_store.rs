//! Image storage
//!
//! Bytes in, `{url, publicId}` out. [`LocalBlobStore`] keeps images under
//! `WORK_DIR/images`, named by the SHA-256 of their content, so uploading
//! the same file twice yields the same id.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::ImageFormat;
use sha2::{Digest, Sha256};
use shared::{AppError, ErrorCode};
use thiserror::Error;

use crate::db::models::ImageRef;

/// Formats accepted for covers, review and chat images
const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("Empty file provided")]
    Empty,

    #[error("File too large: {size} bytes (maximum {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Not an image: {0}")]
    NotAnImage(String),

    #[error("Unsupported image format: {0:?}")]
    UnsupportedFormat(ImageFormat),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<BlobError> for AppError {
    fn from(err: BlobError) -> Self {
        let code = match &err {
            BlobError::TooLarge { .. } => ErrorCode::FileTooLarge,
            BlobError::Empty | BlobError::NotAnImage(_) | BlobError::UnsupportedFormat(_) => {
                ErrorCode::InvalidImage
            }
            BlobError::Io(_) => {
                tracing::error!(error = %err, "Image storage failed");
                ErrorCode::UploadFailed
            }
        };
        AppError::with_message(code, err.to_string())
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an image and return where it can be fetched
    async fn upload(&self, bytes: &[u8], filename: Option<&str>) -> Result<ImageRef, BlobError>;

    /// Read a stored file by name; `None` for unknown or unsafe names
    async fn read(&self, file_name: &str) -> Result<Option<Vec<u8>>, BlobError>;
}

/// SHA-256 of `data`, hex encoded
fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Plain file names only: no separators, no parent references
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.starts_with('.')
}

fn extension_of(format: ImageFormat) -> &'static str {
    format.extensions_str().first().copied().unwrap_or("img")
}

/// Filesystem-backed store served from `/api/images/{file}`
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    dir: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

impl LocalBlobStore {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: &str, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Check size and sniff the format
    fn validate(&self, bytes: &[u8]) -> Result<ImageFormat, BlobError> {
        if bytes.is_empty() {
            return Err(BlobError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(BlobError::TooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }
        let format =
            image::guess_format(bytes).map_err(|e| BlobError::NotAnImage(e.to_string()))?;
        if !SUPPORTED_FORMATS.contains(&format) {
            return Err(BlobError::UnsupportedFormat(format));
        }
        Ok(format)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, bytes: &[u8], filename: Option<&str>) -> Result<ImageRef, BlobError> {
        let format = self.validate(bytes)?;
        let public_id = content_hash(bytes);
        let file_name = format!("{}.{}", public_id, extension_of(format));
        let path = self.dir.join(&file_name);

        if tokio::fs::try_exists(&path).await? {
            tracing::debug!(file = %file_name, "Image already stored");
        } else {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, bytes).await?;
            tracing::info!(
                original_name = filename.unwrap_or("-"),
                file = %file_name,
                size = bytes.len(),
                "Image uploaded"
            );
        }

        Ok(ImageRef {
            url: format!("{}/api/images/{}", self.public_base_url, file_name),
            public_id,
        })
    }

    async fn read(&self, file_name: &str) -> Result<Option<Vec<u8>>, BlobError> {
        if !is_safe_file_name(file_name) {
            return Ok(None);
        }
        match tokio::fs::read(self.dir.join(file_name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Smallest valid PNG header plus IHDR, enough for format sniffing
    const PNG: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
        0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00,
        0x00, 0x1F, 0x15, 0xC4, 0x89,
    ];

    fn store(dir: &Path, max: usize) -> LocalBlobStore {
        LocalBlobStore::new(dir.join("images"), "http://localhost:5000/", max)
    }

    #[tokio::test]
    async fn test_upload_is_content_addressed() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path(), 1024);

        let first = store.upload(PNG, Some("a.png")).await.unwrap();
        let second = store.upload(PNG, Some("b.png")).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.public_id, content_hash(PNG));
        assert!(first.url.starts_with("http://localhost:5000/api/images/"));
        assert!(first.url.ends_with(".png"));

        let file = first.url.rsplit('/').next().unwrap();
        assert_eq!(store.read(file).await.unwrap().as_deref(), Some(PNG));
    }

    #[tokio::test]
    async fn test_rejects_non_images_and_large_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path(), 16);

        let err = store.upload(b"plain text", None).await.unwrap_err();
        assert!(matches!(err, BlobError::NotAnImage(_)));
        assert_eq!(AppError::from(err).code, ErrorCode::InvalidImage);

        let err = store.upload(PNG, None).await.unwrap_err();
        assert!(matches!(err, BlobError::TooLarge { .. }));
        assert_eq!(AppError::from(err).code, ErrorCode::FileTooLarge);

        assert!(matches!(store.upload(&[], None).await, Err(BlobError::Empty)));
    }

    #[tokio::test]
    async fn test_read_refuses_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path(), 1024);
        assert!(store.read("../secret").await.unwrap().is_none());
        assert!(store.read(".env").await.unwrap().is_none());
        assert!(store.read("missing.png").await.unwrap().is_none());
    }
}

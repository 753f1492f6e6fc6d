//! Image attachments for chat queries
//!
//! A selected file is checked to be an image when it is chosen; its bytes are
//! read and base64-encoded only when the request body is assembled.

use crate::agent::AgentError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Maximum image size (5MB)
const MAX_IMAGE_SIZE: u64 = 5 * 1024 * 1024;

/// Why a file could not be selected as an attachment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Not an image file: {0}")]
    NotAnImage(String),
    #[error("No file selected")]
    Empty,
}

/// An image chosen by the user, not yet read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    path: PathBuf,
    media_type: String,
}

impl ImageAttachment {
    /// Select `path` as an attachment if its media type is `image/*`
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SelectionError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(SelectionError::Empty);
        }

        let media_type = mime_guess::from_path(path)
            .iter()
            .find(|mime| mime.type_() == mime_guess::mime::IMAGE)
            .ok_or_else(|| SelectionError::NotAnImage(path.display().to_string()))?;

        Ok(Self {
            path: path.to_path_buf(),
            media_type: media_type.essence_str().to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// URL shown on the user's own message
    pub fn display_url(&self) -> String {
        let absolute = std::path::absolute(&self.path).unwrap_or_else(|_| self.path.clone());
        format!("file://{}", absolute.display())
    }

    /// Read the file and encode it as bare base64 (no `data:` prefix)
    pub async fn encode(&self) -> Result<String, AgentError> {
        let metadata = fs::metadata(&self.path).await.map_err(|e| {
            AgentError::attachment(format!("Cannot read {}: {e}", self.path.display()))
        })?;

        if !metadata.is_file() {
            return Err(AgentError::attachment(format!(
                "Not a file: {}",
                self.path.display()
            )));
        }

        if metadata.len() > MAX_IMAGE_SIZE {
            return Err(AgentError::attachment(format!(
                "Image too large: {} bytes (max {MAX_IMAGE_SIZE} bytes)",
                metadata.len()
            )));
        }

        let bytes = fs::read(&self.path).await.map_err(|e| {
            AgentError::attachment(format!("Cannot read {}: {e}", self.path.display()))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            media_type = %self.media_type,
            bytes = bytes.len(),
            "Encoded image attachment"
        );
        Ok(BASE64.encode(bytes))
    }
}

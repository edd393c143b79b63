//! Video files selected for upload

use reqwest::multipart::Part;
use std::fmt;
use std::path::Path;

use crate::error::{ClientError, ClientResult};

/// A non-empty video file, ready to be sent as a multipart part
#[derive(Clone)]
pub struct VideoUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl VideoUpload {
    /// Wrap in-memory video bytes.
    ///
    /// Fails when the file is empty or the content type is not a video type.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> ClientResult<Self> {
        let file_name = file_name.into();
        let content_type = content_type.into();

        if bytes.is_empty() {
            return Err(ClientError::InvalidInput(format!(
                "Video file '{}' is empty",
                file_name
            )));
        }
        if !content_type.starts_with("video/") {
            return Err(ClientError::InvalidInput(format!(
                "'{}' is not a video file ({})",
                file_name, content_type
            )));
        }

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    /// Read a video from disk, inferring its media type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ClientError::InvalidInput(format!("Invalid video path: {}", path.display()))
            })?
            .to_string();

        let content_type = guess_media_type(&file_name).ok_or_else(|| {
            ClientError::InvalidInput(format!("Unrecognized video format: {}", file_name))
        })?;

        let bytes = tokio::fs::read(path).await?;
        Self::new(file_name, content_type, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Convert into the `video` multipart field
    pub fn into_part(self) -> ClientResult<Part> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)?)
    }
}

impl fmt::Debug for VideoUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Media type for common video container extensions
pub fn guess_media_type(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name).extension()?.to_str()?.to_lowercase();
    match extension.as_str() {
        "mp4" => Some("video/mp4"),
        "m4v" => Some("video/x-m4v"),
        "mov" => Some("video/quicktime"),
        "avi" => Some("video/x-msvideo"),
        "webm" => Some("video/webm"),
        "mkv" => Some("video/x-matroska"),
        _ => None,
    }
}

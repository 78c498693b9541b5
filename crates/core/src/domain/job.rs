// Job Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Job ID (UUID v4)
pub type JobId = String;

/// Generation (for supersede logic, monotonic per session)
pub type Generation = u64;

/// Largest accepted upload (10 MiB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Job State as seen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Running,
    Completed,
    Failed,
    Superseded,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Running)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Running => write!(f, "RUNNING"),
            JobState::Completed => write!(f, "COMPLETED"),
            JobState::Failed => write!(f, "FAILED"),
            JobState::Superseded => write!(f, "SUPERSEDED"),
        }
    }
}

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    /// Detect the format from the leading magic bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }
}

/// Uploaded image bytes, validated once and shared read-only across adapters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Arc<[u8]>,
    format: ImageFormat,
}

impl ImagePayload {
    /// Validate raw upload bytes
    ///
    /// Rejects empty uploads, uploads above [`MAX_IMAGE_BYTES`] and anything
    /// that is not PNG, JPEG or GIF.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes: Vec<u8> = bytes.into();
        if bytes.is_empty() {
            return Err(DomainError::InvalidImage(
                "no image uploaded".to_string(),
            ));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(DomainError::InvalidImage(format!(
                "image is {} bytes, limit is {} bytes (10MB)",
                bytes.len(),
                MAX_IMAGE_BYTES
            )));
        }
        let format = ImageFormat::sniff(&bytes).ok_or_else(|| {
            DomainError::InvalidImage("unsupported format, expected PNG, JPEG or GIF".to_string())
        })?;

        Ok(Self {
            bytes: bytes.into(),
            format,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Job Entity: one end-to-end content-generation request for a single image
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub generation: Generation,
    pub created_at: i64, // epoch ms

    pub image: ImagePayload,
    pub description: Option<String>,
    pub wants_theme: bool,
}

impl Job {
    /// Create a new Job
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `image` - Validated image payload
    /// * `description` - Optional user description; blank text is treated as absent
    /// * `wants_theme` - Whether the mood theme is required for this job
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        image: ImagePayload,
        description: Option<String>,
        wants_theme: bool,
    ) -> Self {
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Self {
            id: id.into(),
            generation: 0,
            created_at,
            image,
            description,
            wants_theme,
        }
    }

    pub fn with_generation(mut self, generation: Generation) -> Self {
        self.generation = generation;
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(ImageFormat::sniff(&PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"BM\x00\x00"), None);
    }

    #[test]
    fn test_empty_upload_rejected() {
        let err = ImagePayload::from_bytes(Vec::new()).unwrap_err();
        assert!(err.to_string().contains("no image"));
    }

    #[test]
    fn test_oversized_upload_rejected() {
        let mut bytes = PNG_HEADER.to_vec();
        bytes.resize(MAX_IMAGE_BYTES + 1, 0);
        let err = ImagePayload::from_bytes(bytes).unwrap_err();
        assert!(err.to_string().contains("10MB"));
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let err = ImagePayload::from_bytes(b"not an image".to_vec()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidImage(_)));
    }

    #[test]
    fn test_blank_description_is_absent() {
        let image = ImagePayload::from_bytes(PNG_HEADER.to_vec()).unwrap();
        let job = Job::new("job-1", 1000, image, Some("   ".to_string()), true);
        assert_eq!(job.description(), None);
        assert_eq!(job.image.mime_type(), "image/png");
    }

    #[test]
    fn test_cloned_payload_shares_bytes() {
        let image = ImagePayload::from_bytes(PNG_HEADER.to_vec()).unwrap();
        let copy = image.clone();
        assert!(std::ptr::eq(image.bytes().as_ptr(), copy.bytes().as_ptr()));
    }
}

//! Book cover uploads

use crate::error::DomainError;

/// Accepted cover image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverFormat {
    Jpeg,
    Png,
    Gif,
}

impl CoverFormat {
    /// Sniff the format from the file's leading bytes
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else {
            None
        }
    }

    /// File extension used when storing the cover
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

/// A validated cover image ready to be written to storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverUpload {
    pub format: CoverFormat,
    pub bytes: Vec<u8>,
}

impl CoverUpload {
    /// Validate type and size. Only JPEG, PNG and GIF up to `max_bytes` are accepted.
    pub fn new(bytes: Vec<u8>, max_bytes: usize) -> Result<Self, DomainError> {
        if bytes.is_empty() {
            return Err(DomainError::InvalidCover("Cover image is empty".to_string()));
        }
        if bytes.len() > max_bytes {
            return Err(DomainError::InvalidCover(format!(
                "Cover image exceeds {} MB",
                max_bytes / (1024 * 1024)
            )));
        }
        let format = CoverFormat::detect(&bytes).ok_or_else(|| {
            DomainError::InvalidCover("Only JPEG, PNG and GIF images are allowed".to_string())
        })?;
        Ok(Self { format, bytes })
    }
}

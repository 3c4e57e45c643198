//! File Validator: pure type/size predicate over a candidate upload.

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

/// Upload ceiling: 10 MiB.
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Image kinds plus the portable-document kind.
pub const ALLOWED_MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "application/pdf",
];

/// A locally selected file, not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFile {
    pub name: String,
    /// Declared media kind, as reported by the uploader.
    pub media_type: String,
    pub content: Bytes,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, content: Bytes) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            content,
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Media type without parameters, lowercased.
    pub fn essence(&self) -> String {
        media_type_essence(&self.media_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationError {
    #[error("Please upload a JPG, PNG, or PDF file")]
    UnsupportedType,
    #[error("File size must be less than 10MB")]
    TooLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected(ValidationError),
}

fn media_type_essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn is_allowed_media_type(media_type: &str) -> bool {
    let essence = media_type_essence(media_type);
    ALLOWED_MEDIA_TYPES.contains(&essence.as_str())
}

/// Size is checked before kind, so an oversized file is always `TooLarge`.
pub fn validate_file(file: &CandidateFile) -> ValidationOutcome {
    if file.size() > MAX_FILE_BYTES {
        return ValidationOutcome::Rejected(ValidationError::TooLarge);
    }
    if !is_allowed_media_type(&file.media_type) {
        return ValidationOutcome::Rejected(ValidationError::UnsupportedType);
    }
    ValidationOutcome::Accepted
}

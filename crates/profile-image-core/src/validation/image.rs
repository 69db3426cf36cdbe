//! Candidate image validation
//!
//! Runs before any preview or network work. Rules:
//! - Declared media type must start with `image/`
//! - Size must not exceed [`MAX_PROFILE_IMAGE_BYTES`]

use thiserror::Error;

use crate::constants::{IMAGE_CONTENT_TYPE_PREFIX, MAX_PROFILE_IMAGE_BYTES};
use crate::models::CandidateFile;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Only image files can be uploaded.")]
    InvalidType { content_type: String },

    #[error("File size cannot exceed 5MB.")]
    TooLarge { size: u64, max: u64 },
}

pub fn validate_image(file: &CandidateFile) -> Result<(), ValidationError> {
    if !file
        .content_type
        .to_ascii_lowercase()
        .starts_with(IMAGE_CONTENT_TYPE_PREFIX)
    {
        return Err(ValidationError::InvalidType {
            content_type: file.content_type.clone(),
        });
    }

    if file.size() > MAX_PROFILE_IMAGE_BYTES {
        return Err(ValidationError::TooLarge {
            size: file.size(),
            max: MAX_PROFILE_IMAGE_BYTES,
        });
    }

    Ok(())
}

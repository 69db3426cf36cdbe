//! Shared key and URL handling for storage backends.
//!
//! Key format: `images/{user_id}/{file_name}`. Object URLs are the backend's base
//! URL followed by the key with each segment percent-encoded.

use crate::traits::{StorageError, StorageResult};
use profile_image_core::constants::IMAGE_KEY_PREFIX;

/// Generate the storage key for a user's profile image.
///
/// Both parts become single path segments, so they must be non-empty and must not
/// contain separators or relative components.
pub fn generate_storage_key(owner_id: &str, file_name: &str) -> StorageResult<String> {
    validate_segment("user id", owner_id)?;
    validate_segment("file name", file_name)?;
    Ok(format!("{}/{}/{}", IMAGE_KEY_PREFIX, owner_id, file_name))
}

fn validate_segment(label: &str, segment: &str) -> StorageResult<()> {
    if segment.is_empty() {
        return Err(StorageError::InvalidKey(format!("{} cannot be empty", label)));
    }
    if segment == "." || segment == ".." || segment.contains('/') || segment.contains('\\') {
        return Err(StorageError::InvalidKey(format!(
            "{} '{}' contains invalid characters",
            label, segment
        )));
    }
    Ok(())
}

/// Build the public URL for `key` under `base_url`.
pub fn object_url(base_url: &str, key: &str) -> String {
    let encoded = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{}/{}", base_url.trim_end_matches('/'), encoded)
}

/// Recover the storage key from an object URL.
///
/// The URL must start with `base_url`; the remainder is percent-decoded.
pub fn key_from_url(base_url: &str, url: &str) -> StorageResult<String> {
    let prefix = format!("{}/", base_url.trim_end_matches('/'));
    let encoded = url
        .strip_prefix(&prefix)
        .ok_or_else(|| StorageError::UrlMismatch {
            url: url.to_string(),
            base_url: prefix.clone(),
        })?;

    let key = urlencoding::decode(encoded)
        .map_err(|e| StorageError::InvalidKey(format!("Failed to decode '{}': {}", encoded, e)))?
        .into_owned();

    if key.is_empty() {
        return Err(StorageError::InvalidKey(format!(
            "URL {} does not name an object",
            url
        )));
    }

    Ok(key)
}

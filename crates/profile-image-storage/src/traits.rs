//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::keys;
use crate::StorageBackend;
use async_trait::async_trait;
use profile_image_core::CandidateFile;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed for {key}: {source}")]
    UploadFailed {
        key: String,
        #[source]
        source: object_store::Error,
    },

    #[error("Delete failed for {key}: {source}")]
    DeleteFailed {
        key: String,
        #[source]
        source: object_store::Error,
    },

    #[error("URL {url} does not belong to storage at {base_url}")]
    UrlMismatch { url: String, base_url: String },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(#[from] object_store::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Location of an object written by [`Storage::upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Storage key, `images/{user_id}/{file_name}`
    pub key: String,
    /// Public URL; this is the value persisted as the profile image reference.
    pub url: String,
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the upload
/// orchestrator never couples to a specific object store.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write the file to `images/{owner_id}/{file.name}` with the file's declared
    /// content type.
    ///
    /// Either the object exists at the returned location afterwards or the call
    /// failed without creating or modifying anything.
    async fn upload(&self, owner_id: &str, file: &CandidateFile) -> StorageResult<StoredObject>;

    /// Delete the object behind a URL previously returned by [`Storage::upload`].
    ///
    /// Fails with [`StorageError::UrlMismatch`] when the URL is not under
    /// [`Storage::base_url`]. A missing object counts as deleted.
    async fn delete(&self, location_url: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// URL prefix every object URL of this backend starts with, ending in `/`.
    fn base_url(&self) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Recover the storage key from an object URL of this backend.
    fn key_for_url(&self, location_url: &str) -> StorageResult<String> {
        keys::key_from_url(&self.base_url(), location_url)
    }
}

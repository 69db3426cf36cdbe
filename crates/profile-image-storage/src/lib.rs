//! Profile Image Storage Library
//!
//! This crate provides the storage abstraction for profile images and its
//! implementations for S3 and the local filesystem, both built on `object_store`.
//!
//! # Storage key format
//!
//! Every backend uses the same key layout: `images/{user_id}/{file_name}`.
//! The user id keeps users apart; re-uploading a file with the same name
//! overwrites the previous object. Key and URL handling lives in the `keys`
//! module so all backends stay consistent.
//!
//! # Deletes are idempotent
//!
//! Deleting a key that does not exist succeeds on every backend.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub(crate) mod object;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use profile_image_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};

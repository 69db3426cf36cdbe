//! Profile Image Core Library
//!
//! Domain models, configuration and validation shared by the storage, API client,
//! sync and CLI crates.

pub mod config;
pub mod constants;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::ProfileImageConfig;
pub use models::{resolve_image_url, AuthCredentials, CandidateFile, UserIdentity};
pub use storage_types::StorageBackend;
pub use validation::{validate_image, ValidationError};

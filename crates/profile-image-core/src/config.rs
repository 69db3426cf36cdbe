//! Configuration module
//!
//! Environment-driven settings for the backend API, the object store holding
//! profile images and the local identity snapshot. Nothing here is global: the
//! loaded [`ProfileImageConfig`] is passed to the constructors that need it.

use std::env;
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

const DEFAULT_API_URL: &str = "http://localhost:5000";
const DEFAULT_IDENTITY_PATH: &str = ".profile-image/identity.json";

/// Settings for the S3 (or S3-compatible) backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub endpoint: Option<String>,
}

/// Settings for the local filesystem backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalStorageSettings {
    pub path: PathBuf,
    pub base_url: String,
}

#[derive(Clone, Debug)]
pub struct ProfileImageConfig {
    pub environment: String,
    pub api_url: String,
    pub identity_path: PathBuf,
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

impl ProfileImageConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// `from_env` uses the process environment; tests pass a map instead.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let api_url = lookup("API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let config = ProfileImageConfig {
            environment,
            api_url,
            identity_path: lookup("IDENTITY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IDENTITY_PATH)),
            storage_backend,
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION"),
            s3_endpoint: lookup("S3_ENDPOINT"),
            aws_region: lookup("AWS_REGION"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL"),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "API_URL must be an absolute http(s) URL, got '{}'",
                self.api_url
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    /// S3 settings, if the S3 backend is fully configured.
    ///
    /// `S3_REGION` wins over `AWS_REGION`.
    pub fn s3_settings(&self) -> Option<S3Settings> {
        let bucket = self.s3_bucket.clone()?;
        let region = self.s3_region.clone().or_else(|| self.aws_region.clone())?;
        Some(S3Settings {
            bucket,
            region,
            endpoint: self.s3_endpoint.clone(),
        })
    }

    pub fn local_storage_settings(&self) -> Option<LocalStorageSettings> {
        Some(LocalStorageSettings {
            path: PathBuf::from(self.local_storage_path.as_deref()?),
            base_url: self.local_storage_base_url.clone()?,
        })
    }
}

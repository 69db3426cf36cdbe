use crate::keys::{generate_storage_key, object_url};
use crate::object::{delete_object, object_exists, put_object};
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::ObjectStore;
use profile_image_core::config::S3Settings;
use profile_image_core::CandidateFile;
use std::sync::Arc;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// Credentials come from the standard AWS environment variables
    /// (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, ...). Bucket, region and the
    /// optional endpoint come from `settings`.
    pub fn new(settings: &S3Settings) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(settings.region.clone())
            .with_bucket_name(settings.bucket.clone());

        if let Some(ref endpoint) = settings.endpoint {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(Self::with_store(Arc::new(store), settings))
    }

    /// Wrap an already-built object store (e.g. `object_store::memory::InMemory`)
    /// while keeping the S3 URL layout of `settings`.
    pub fn with_store(store: Arc<dyn ObjectStore>, settings: &S3Settings) -> Self {
        S3Storage {
            store,
            bucket: settings.bucket.clone(),
            region: settings.region.clone(),
            endpoint_url: settings.endpoint.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(&self, owner_id: &str, file: &CandidateFile) -> StorageResult<StoredObject> {
        let key = generate_storage_key(owner_id, &file.name)?;

        put_object(
            self.store.as_ref(),
            &self.bucket,
            &key,
            Some(&file.content_type),
            file.data.clone(),
        )
        .await?;

        let url = object_url(&self.base_url(), &key);
        Ok(StoredObject { key, url })
    }

    async fn delete(&self, location_url: &str) -> StorageResult<()> {
        let key = self.key_for_url(location_url)?;
        delete_object(self.store.as_ref(), &self.bucket, &key).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        object_exists(self.store.as_ref(), storage_key).await
    }

    /// For AWS S3, uses the virtual-hosted format: https://{bucket}.s3.{region}.amazonaws.com/
    /// For S3-compatible providers, uses path-style under the endpoint: {endpoint}/{bucket}/
    fn base_url(&self) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            format!("{}/{}/", endpoint.trim_end_matches('/'), self.bucket)
        } else {
            format!("https://{}.s3.{}.amazonaws.com/", self.bucket, self.region)
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

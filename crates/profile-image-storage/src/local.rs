use crate::keys::{generate_storage_key, object_url};
use crate::object::{delete_object, object_exists, put_object};
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use object_store::local::LocalFileSystem;
use profile_image_core::config::LocalStorageSettings;
use profile_image_core::CandidateFile;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;

/// Local filesystem storage implementation
///
/// Keeps the S3 key layout under `base_path` and serves URLs under `base_url`.
/// The filesystem has no place for a content type, so it is not recorded.
#[derive(Clone)]
pub struct LocalStorage {
    store: Arc<LocalFileSystem>,
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating the root directory if needed.
    pub async fn new(settings: &LocalStorageSettings) -> StorageResult<Self> {
        let base_path = settings.path.clone();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let store = LocalFileSystem::new_with_prefix(&base_path)
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(LocalStorage {
            store: Arc::new(store),
            base_path,
            base_url: settings.base_url.clone(),
        })
    }

    fn store_label(&self) -> String {
        self.base_path.display().to_string()
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, owner_id: &str, file: &CandidateFile) -> StorageResult<StoredObject> {
        let key = generate_storage_key(owner_id, &file.name)?;

        put_object(
            self.store.as_ref(),
            &self.store_label(),
            &key,
            None,
            file.data.clone(),
        )
        .await?;

        let url = object_url(&self.base_url, &key);
        Ok(StoredObject { key, url })
    }

    async fn delete(&self, location_url: &str) -> StorageResult<()> {
        let key = self.key_for_url(location_url)?;
        delete_object(self.store.as_ref(), &self.store_label(), &key).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        object_exists(self.store.as_ref(), storage_key).await
    }

    fn base_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

//! Test doubles for the uploader's collaborators.

use crate::preview::{PreviewManager, PreviewReference};
use async_trait::async_trait;
use object_store::memory::InMemory;
use profile_image_api_client::{ProfileApiError, ProfileRecords};
use profile_image_core::config::S3Settings;
use profile_image_core::{AuthCredentials, CandidateFile, StorageBackend, UserIdentity};
use profile_image_storage::{S3Storage, Storage, StorageError, StorageResult, StoredObject};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn user(id: &str, profile_image: &str) -> UserIdentity {
    UserIdentity {
        id: id.to_string(),
        token: "token-1".to_string(),
        session_id: "session-1".to_string(),
        profile_image: profile_image.to_string(),
        ..Default::default()
    }
}

pub fn png(name: &str, size: usize) -> CandidateFile {
    CandidateFile::new(name, "image/png", vec![0u8; size])
}

fn simulated_outage() -> object_store::Error {
    object_store::Error::Generic {
        store: "test",
        source: "simulated outage".into(),
    }
}

/// In-memory S3 layout (`bucket` / `region`) with call counters and failure switches.
pub struct RecordingStorage {
    inner: S3Storage,
    uploads: AtomicUsize,
    deletes: AtomicUsize,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl RecordingStorage {
    pub fn new() -> Self {
        let settings = S3Settings {
            bucket: "bucket".to_string(),
            region: "region".to_string(),
            endpoint: None,
        };
        Self {
            inner: S3Storage::with_store(Arc::new(InMemory::new()), &settings),
            uploads: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
            fail_uploads: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn upload_calls(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.inner.exists(key).await.unwrap()
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn upload(&self, owner_id: &str, file: &CandidateFile) -> StorageResult<StoredObject> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed {
                key: format!("images/{}/{}", owner_id, file.name),
                source: simulated_outage(),
            });
        }
        self.inner.upload(owner_id, file).await
    }

    async fn delete(&self, location_url: &str) -> StorageResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed {
                key: location_url.to_string(),
                source: simulated_outage(),
            });
        }
        self.inner.delete(location_url).await
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.inner.exists(storage_key).await
    }

    fn base_url(&self) -> String {
        self.inner.base_url()
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}

/// Backend record held in memory; can be told to reject every call.
pub struct RecordingRecords {
    reference: Mutex<String>,
    calls: AtomicUsize,
    fail_with: Mutex<Option<(u16, String)>>,
}

impl RecordingRecords {
    pub fn new(reference: &str) -> Self {
        Self {
            reference: Mutex::new(reference.to_string()),
            calls: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
        }
    }

    pub fn reference(&self) -> String {
        self.reference.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, status: u16, message: &str) {
        *self.fail_with.lock().unwrap() = Some((status, message.to_string()));
    }

    pub fn recover(&self) {
        *self.fail_with.lock().unwrap() = None;
    }

    fn record(&self, value: &str) -> Result<(), ProfileApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((status, message)) = self.fail_with.lock().unwrap().clone() {
            return Err(ProfileApiError::ServerRejected { status, message });
        }
        *self.reference.lock().unwrap() = value.to_string();
        Ok(())
    }
}

#[async_trait]
impl ProfileRecords for RecordingRecords {
    async fn set_image(
        &self,
        _credentials: &AuthCredentials,
        location: &str,
    ) -> Result<(), ProfileApiError> {
        self.record(location)
    }

    async fn clear_image(&self, _credentials: &AuthCredentials) -> Result<(), ProfileApiError> {
        self.record("")
    }
}

/// Preview manager that can never create a local preview.
pub struct FailingPreviewManager;

impl PreviewManager for FailingPreviewManager {
    fn show_local(&self, _file: &CandidateFile) -> std::io::Result<PreviewReference> {
        Err(std::io::Error::other("no space left on device"))
    }

    fn release(&self, _reference: &PreviewReference) {}

    fn live_count(&self) -> usize {
        0
    }
}

//! Locally cached identity and profile change notifications.
//!
//! The cache is never the source of truth: it is only written after the backend
//! acknowledged a change. Other surfaces (a header avatar, a menu) subscribe to
//! [`IdentityCache::subscribe`] and re-render on [`ProfileUpdated`].

use profile_image_core::models::IdentityPatch;
use profile_image_core::UserIdentity;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::broadcast;
#[cfg(unix)]
use std::{io::Write, os::unix::fs::OpenOptionsExt};

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("No signed-in user is cached")]
    Missing,

    #[error("Failed to access identity file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Identity record is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Key-value slot holding the serialized signed-in user.
pub trait IdentityStore: Send + Sync {
    fn load(&self) -> Result<Option<UserIdentity>, IdentityError>;

    fn save(&self, identity: &UserIdentity) -> Result<(), IdentityError>;
}

/// Identity persisted as a JSON file, readable only by the owner on unix.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> IdentityError {
        IdentityError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn secure_write(&self, content: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        #[cfg(unix)]
        {
            std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)?
                .write_all(content.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            std::fs::write(&self.path, content)?;
        }

        Ok(())
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Result<Option<UserIdentity>, IdentityError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if raw.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, identity: &UserIdentity) -> Result<(), IdentityError> {
        let raw = serde_json::to_string(identity)?;
        self.secure_write(&raw).map_err(|e| self.io_error(e))
    }
}

#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    identity: Mutex<Option<UserIdentity>>,
}

impl MemoryIdentityStore {
    pub fn new(identity: Option<UserIdentity>) -> Self {
        Self {
            identity: Mutex::new(identity),
        }
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self) -> Result<Option<UserIdentity>, IdentityError> {
        Ok(self
            .identity
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, identity: &UserIdentity) -> Result<(), IdentityError> {
        *self.identity.lock().unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
        Ok(())
    }
}

/// Zero-payload event: the signed-in user's profile changed, re-read the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileUpdated;

/// Shared identity state: the persisted snapshot plus its change channel.
#[derive(Clone)]
pub struct IdentityCache {
    store: Arc<dyn IdentityStore>,
    events: broadcast::Sender<ProfileUpdated>,
}

impl IdentityCache {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { store, events }
    }

    pub fn current(&self) -> Result<Option<UserIdentity>, IdentityError> {
        self.store.load()
    }

    /// Merge `patch` into the cached identity and write it back.
    pub fn update(&self, patch: &IdentityPatch) -> Result<UserIdentity, IdentityError> {
        let mut identity = self.store.load()?.ok_or(IdentityError::Missing)?;
        identity.apply(patch);
        self.store.save(&identity)?;
        Ok(identity)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProfileUpdated> {
        self.events.subscribe()
    }

    pub fn notify_profile_updated(&self) {
        // No subscribers is fine
        let receivers = self.events.send(ProfileUpdated).unwrap_or(0);
        tracing::debug!(receivers, "Profile update broadcast");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in() -> UserIdentity {
        UserIdentity {
            id: "u1".to_string(),
            token: "t".to_string(),
            session_id: "s".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileIdentityStore::new(dir.path().join("nested/identity.json"));

        assert!(store.load().unwrap().is_none());

        store.save(&signed_in()).unwrap();
        assert_eq!(store.load().unwrap(), Some(signed_in()));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileIdentityStore::new(dir.path().join("identity.json"));
        store.save(&signed_in()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileIdentityStore::new(&path).load();
        assert!(matches!(result, Err(IdentityError::Serde(_))));
    }

    #[test]
    fn test_update_merges_profile_image() {
        let cache = IdentityCache::new(Arc::new(MemoryIdentityStore::new(Some(signed_in()))));

        let updated = cache
            .update(&IdentityPatch::profile_image("https://cdn/a.png"))
            .unwrap();

        assert_eq!(updated.profile_image, "https://cdn/a.png");
        assert_eq!(updated.token, "t");
        assert_eq!(
            cache.current().unwrap().unwrap().profile_image,
            "https://cdn/a.png"
        );
    }

    #[test]
    fn test_update_without_identity_fails() {
        let cache = IdentityCache::new(Arc::new(MemoryIdentityStore::default()));
        let result = cache.update(&IdentityPatch::profile_image(""));
        assert!(matches!(result, Err(IdentityError::Missing)));
    }

    #[tokio::test]
    async fn test_subscribers_receive_profile_updates() {
        let cache = IdentityCache::new(Arc::new(MemoryIdentityStore::default()));
        let mut header = cache.subscribe();
        let mut menu = cache.clone().subscribe();

        cache.notify_profile_updated();

        assert_eq!(header.recv().await.unwrap(), ProfileUpdated);
        assert_eq!(menu.recv().await.unwrap(), ProfileUpdated);
    }

    #[test]
    fn test_notify_without_subscribers_is_fine() {
        let cache = IdentityCache::new(Arc::new(MemoryIdentityStore::default()));
        cache.notify_profile_updated();
    }
}

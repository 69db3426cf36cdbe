//! Preview resources.
//!
//! A [`PreviewManager`] turns a picked file into something renderable before the
//! upload is confirmed. Local previews are owned resources and must be released
//! exactly once; remote previews are plain URLs and releasing them does nothing.
//! Managers hold at most one local preview: creating a new one releases the
//! previous one.
//!
//! [`PreviewSlot`] is the two-phase view the uploader works with: a confirmed
//! image URL plus an optional tentative local preview that is either committed
//! or reverted.

use bytes::Bytes;
use profile_image_core::CandidateFile;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tempfile::TempPath;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewReference {
    /// A persisted image; never released.
    Remote { url: String },
    /// A per-selection resource owned by a [`PreviewManager`].
    Local { id: Uuid, url: String },
}

impl PreviewReference {
    pub fn url(&self) -> &str {
        match self {
            PreviewReference::Remote { url } | PreviewReference::Local { url, .. } => url,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, PreviewReference::Local { .. })
    }
}

pub trait PreviewManager: Send + Sync {
    /// Create a local preview of `file`, releasing the previously held one.
    fn show_local(&self, file: &CandidateFile) -> std::io::Result<PreviewReference>;

    fn show_remote(&self, url: &str) -> PreviewReference {
        PreviewReference::Remote {
            url: url.to_string(),
        }
    }

    /// Release a preview. Remote and already-released references are ignored.
    fn release(&self, reference: &PreviewReference);

    /// Number of local previews currently held.
    fn live_count(&self) -> usize;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Held<T> {
    live: HashMap<Uuid, T>,
    current: Option<Uuid>,
}

impl<T> Default for Held<T> {
    fn default() -> Self {
        Self {
            live: HashMap::new(),
            current: None,
        }
    }
}

impl<T> Held<T> {
    /// Drop the current resource and register `resource` as the new current one.
    fn replace(&mut self, id: Uuid, resource: T) {
        if let Some(previous) = self.current.take() {
            self.live.remove(&previous);
        }
        self.live.insert(id, resource);
        self.current = Some(id);
    }

    fn release(&mut self, reference: &PreviewReference) {
        if let PreviewReference::Local { id, .. } = reference {
            self.live.remove(id);
            if self.current == Some(*id) {
                self.current = None;
            }
        }
    }
}

/// Keeps preview bytes in memory under `blob:` style handles.
#[derive(Default)]
pub struct MemoryPreviewManager {
    held: Mutex<Held<Bytes>>,
}

impl MemoryPreviewManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes behind a live local reference.
    pub fn data(&self, reference: &PreviewReference) -> Option<Bytes> {
        match reference {
            PreviewReference::Local { id, .. } => lock(&self.held).live.get(id).cloned(),
            PreviewReference::Remote { .. } => None,
        }
    }
}

impl PreviewManager for MemoryPreviewManager {
    fn show_local(&self, file: &CandidateFile) -> std::io::Result<PreviewReference> {
        let id = Uuid::new_v4();
        lock(&self.held).replace(id, file.data.clone());
        Ok(PreviewReference::Local {
            id,
            url: format!("blob:preview/{}", id),
        })
    }

    fn release(&self, reference: &PreviewReference) {
        lock(&self.held).release(reference);
    }

    fn live_count(&self) -> usize {
        lock(&self.held).live.len()
    }
}

/// Writes previews to temporary files for native clients; releasing deletes the file.
pub struct TempFilePreviewManager {
    dir: PathBuf,
    held: Mutex<Held<TempPath>>,
}

impl TempFilePreviewManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            held: Mutex::new(Held::default()),
        }
    }

    /// Previews in the system temp directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl PreviewManager for TempFilePreviewManager {
    fn show_local(&self, file: &CandidateFile) -> std::io::Result<PreviewReference> {
        let suffix = Path::new(&file.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        let mut temp = tempfile::Builder::new()
            .prefix("profile-preview-")
            .suffix(&suffix)
            .tempfile_in(&self.dir)?;
        temp.write_all(&file.data)?;
        temp.flush()?;
        let path = temp.into_temp_path();

        let id = Uuid::new_v4();
        let url = format!("file://{}", path.display());
        lock(&self.held).replace(id, path);

        Ok(PreviewReference::Local { id, url })
    }

    fn release(&self, reference: &PreviewReference) {
        lock(&self.held).release(reference);
    }

    fn live_count(&self) -> usize {
        lock(&self.held).live.len()
    }
}

/// Confirmed image plus an optional tentative local preview.
///
/// The displayed reference is the tentative one while an upload is in flight and
/// the confirmed one otherwise. Any local preview still held when the slot is
/// dropped is released.
pub struct PreviewSlot {
    manager: Arc<dyn PreviewManager>,
    displayed: Option<PreviewReference>,
    confirmed_url: Option<String>,
    tentative: bool,
}

impl PreviewSlot {
    pub fn new(manager: Arc<dyn PreviewManager>, confirmed_url: Option<String>) -> Self {
        let displayed = confirmed_url.as_deref().map(|url| manager.show_remote(url));
        Self {
            manager,
            displayed,
            confirmed_url,
            tentative: false,
        }
    }

    pub fn displayed(&self) -> Option<&PreviewReference> {
        self.displayed.as_ref()
    }

    /// Last known-good image URL.
    pub fn confirmed_url(&self) -> Option<&str> {
        self.confirmed_url.as_deref()
    }

    pub fn is_tentative(&self) -> bool {
        self.tentative
    }

    /// Show `file` before the upload is confirmed.
    ///
    /// If the manager cannot create a preview the current one stays on screen.
    pub fn show_tentative(&mut self, file: &CandidateFile) {
        match self.manager.show_local(file) {
            Ok(reference) => {
                if let Some(previous) = self.displayed.replace(reference) {
                    self.manager.release(&previous);
                }
                self.tentative = true;
            }
            Err(e) => {
                tracing::warn!(error = %e, file = %file.name, "Failed to create local preview");
            }
        }
    }

    /// The tentative preview now shows the image stored at `url`.
    ///
    /// Without a tentative preview (none was created) the stored image replaces
    /// whatever is displayed.
    pub fn commit(&mut self, url: &str) {
        if self.tentative {
            self.confirmed_url = Some(url.to_string());
            self.tentative = false;
        } else {
            self.show_confirmed(Some(url.to_string()));
        }
    }

    /// Drop the tentative preview and show the confirmed image again.
    pub fn revert(&mut self) {
        let confirmed = self.confirmed_url.clone();
        self.show_confirmed(confirmed);
    }

    /// Replace the confirmed image, releasing whatever was displayed.
    pub fn reset(&mut self, confirmed_url: Option<String>) {
        self.show_confirmed(confirmed_url);
    }

    /// Show nothing at all.
    pub fn clear(&mut self) {
        self.show_confirmed(None);
    }

    fn show_confirmed(&mut self, confirmed_url: Option<String>) {
        self.release_displayed();
        self.displayed = confirmed_url
            .as_deref()
            .map(|url| self.manager.show_remote(url));
        self.confirmed_url = confirmed_url;
        self.tentative = false;
    }

    fn release_displayed(&mut self) {
        if let Some(reference) = self.displayed.take() {
            self.manager.release(&reference);
        }
    }
}

impl Drop for PreviewSlot {
    fn drop(&mut self) {
        self.release_displayed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::FailingPreviewManager;

    fn png(name: &str) -> CandidateFile {
        CandidateFile::new(name, "image/png", b"\x89PNG".to_vec())
    }

    #[test]
    fn test_show_local_releases_previous() {
        let manager = MemoryPreviewManager::new();

        let first = manager.show_local(&png("a.png")).unwrap();
        let second = manager.show_local(&png("b.png")).unwrap();

        assert_eq!(manager.live_count(), 1);
        assert!(manager.data(&first).is_none());
        assert!(manager.data(&second).is_some());
        assert!(second.url().starts_with("blob:preview/"));
    }

    #[test]
    fn test_double_release_does_not_touch_newer_reference() {
        let manager = MemoryPreviewManager::new();

        let first = manager.show_local(&png("a.png")).unwrap();
        manager.release(&first);
        manager.release(&first);
        let second = manager.show_local(&png("b.png")).unwrap();
        manager.release(&first);

        assert_eq!(manager.live_count(), 1);
        assert!(manager.data(&second).is_some());
    }

    #[test]
    fn test_remote_release_is_noop() {
        let manager = MemoryPreviewManager::new();
        let local = manager.show_local(&png("a.png")).unwrap();
        let remote = manager.show_remote("https://cdn.example.com/a.png");

        manager.release(&remote);

        assert!(!remote.is_ephemeral());
        assert_eq!(remote.url(), "https://cdn.example.com/a.png");
        assert!(manager.data(&local).is_some());
    }

    #[test]
    fn test_temp_file_previews_are_deleted_on_release() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TempFilePreviewManager::new(dir.path());

        let first = manager.show_local(&png("a.png")).unwrap();
        let first_path = PathBuf::from(first.url().trim_start_matches("file://"));
        assert!(first_path.exists());
        assert!(first_path.to_string_lossy().ends_with(".png"));

        let second = manager.show_local(&png("b.png")).unwrap();
        let second_path = PathBuf::from(second.url().trim_start_matches("file://"));
        assert!(!first_path.exists());
        assert!(second_path.exists());

        manager.release(&second);
        manager.release(&second);
        assert!(!second_path.exists());
        assert_eq!(manager.live_count(), 0);
    }

    #[test]
    fn test_slot_revert_restores_confirmed_image() {
        let manager = Arc::new(MemoryPreviewManager::new());
        let mut slot = PreviewSlot::new(manager.clone(), Some("https://cdn/old.png".to_string()));

        slot.show_tentative(&png("new.png"));
        assert!(slot.is_tentative());
        assert!(slot.displayed().unwrap().is_ephemeral());

        slot.revert();
        assert!(!slot.is_tentative());
        assert_eq!(slot.displayed().unwrap().url(), "https://cdn/old.png");
        assert_eq!(manager.live_count(), 0);
    }

    #[test]
    fn test_slot_commit_keeps_local_preview_until_dropped() {
        let manager = Arc::new(MemoryPreviewManager::new());
        let mut slot = PreviewSlot::new(manager.clone(), None);

        slot.show_tentative(&png("new.png"));
        slot.commit("https://cdn/new.png");

        assert_eq!(slot.confirmed_url(), Some("https://cdn/new.png"));
        assert!(slot.displayed().unwrap().is_ephemeral());
        assert_eq!(manager.live_count(), 1);

        drop(slot);
        assert_eq!(manager.live_count(), 0);
    }

    #[test]
    fn test_slot_commit_without_local_preview_shows_stored_image() {
        let mut slot = PreviewSlot::new(
            Arc::new(FailingPreviewManager),
            Some("https://cdn/old.png".to_string()),
        );

        slot.show_tentative(&png("new.png"));
        assert!(!slot.is_tentative());
        assert_eq!(slot.displayed().unwrap().url(), "https://cdn/old.png");

        slot.commit("https://cdn/new.png");
        assert_eq!(slot.confirmed_url(), Some("https://cdn/new.png"));
        assert_eq!(slot.displayed().unwrap().url(), "https://cdn/new.png");
    }

    #[test]
    fn test_slot_clear_shows_nothing() {
        let manager = Arc::new(MemoryPreviewManager::new());
        let mut slot = PreviewSlot::new(manager.clone(), Some("https://cdn/old.png".to_string()));
        slot.show_tentative(&png("new.png"));

        slot.clear();

        assert!(slot.displayed().is_none());
        assert!(slot.confirmed_url().is_none());
        assert_eq!(manager.live_count(), 0);
    }
}

//! Upload/removal orchestration.
//!
//! Upload: validate, show a tentative preview, write the object, point the
//! backend record at it, then update the cache, call back and broadcast.
//! Removal: delete the object, clear the backend record, then update the cache,
//! clear the preview, call back and broadcast.
//!
//! Storage is always mutated before the backend record. A backend failure after a
//! successful storage write leaves an orphaned object (upload) or a dangling
//! reference (removal); neither is reconciled here, both are logged.

use crate::error::UploadError;
use crate::identity::IdentityCache;
use crate::preview::{PreviewManager, PreviewReference, PreviewSlot};
use crate::state::{UploadPhase, UploadSession};
use profile_image_api_client::ProfileRecords;
use profile_image_core::models::IdentityPatch;
use profile_image_core::{resolve_image_url, validate_image, AuthCredentials, CandidateFile, UserIdentity};
use profile_image_storage::Storage;
use std::sync::Arc;
use tokio::sync::watch;

type ImageChangeCallback = Box<dyn Fn(&str) + Send + Sync>;

pub struct ProfileImageUploader {
    storage: Arc<dyn Storage>,
    records: Arc<dyn ProfileRecords>,
    identity: IdentityCache,
    preview: PreviewSlot,
    api_url: String,
    on_image_change: ImageChangeCallback,
    session: watch::Sender<UploadSession>,
}

impl ProfileImageUploader {
    pub fn new(
        storage: Arc<dyn Storage>,
        records: Arc<dyn ProfileRecords>,
        previews: Arc<dyn PreviewManager>,
        identity: IdentityCache,
        api_url: impl Into<String>,
    ) -> Self {
        let (session, _) = watch::channel(UploadSession::default());
        Self {
            storage,
            records,
            identity,
            preview: PreviewSlot::new(previews, None),
            api_url: api_url.into(),
            on_image_change: Box::new(|_| {}),
            session,
        }
    }

    /// Seed the displayed image with the caller's current reference.
    pub fn with_current_image(mut self, current_image: &str) -> Self {
        self.set_current_image(current_image);
        self
    }

    /// Called once per successful operation with the new reference (`""` after removal).
    pub fn on_image_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_image_change = Box::new(callback);
        self
    }

    /// The caller's reference changed; show it instead of whatever is displayed.
    ///
    /// Relative references are resolved against the API base URL.
    pub fn set_current_image(&mut self, current_image: &str) {
        self.preview
            .reset(resolve_image_url(&self.api_url, current_image));
    }

    pub fn session(&self) -> UploadSession {
        self.session.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<UploadSession> {
        self.session.subscribe()
    }

    pub fn preview(&self) -> Option<&PreviewReference> {
        self.preview.displayed()
    }

    pub fn current_image(&self) -> Option<&str> {
        self.preview.confirmed_url()
    }

    pub fn can_remove(&self) -> bool {
        self.preview.displayed().is_some() && !self.session.borrow().is_busy()
    }

    pub fn identity(&self) -> &IdentityCache {
        &self.identity
    }

    /// Upload `file` as the new profile image and return its stored URL.
    ///
    /// Failures are also reflected in the session as `Error(message)` with the
    /// preview reverted to the last confirmed image.
    pub async fn upload(&mut self, file: CandidateFile) -> Result<String, UploadError> {
        self.session.send_modify(|s| s.selected_file = Some(file.name.clone()));

        let result = self.run_upload(&file).await;

        match &result {
            Ok(location) => {
                tracing::info!(file = %file.name, location = %location, "Profile image uploaded");
                self.finish(UploadPhase::Idle);
            }
            Err(e) => {
                if self.preview.is_tentative() {
                    self.preview.revert();
                }
                tracing::warn!(file = %file.name, error = %e, "Profile image upload failed");
                self.finish(UploadPhase::Error(e.user_message()));
            }
        }

        result
    }

    /// Remove the current profile image from storage and the backend record.
    pub async fn remove(&mut self) -> Result<(), UploadError> {
        self.transition(UploadPhase::Removing);

        let result = self.run_remove().await;

        match &result {
            Ok(()) => {
                tracing::info!("Profile image removed");
                self.finish(UploadPhase::Idle);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Profile image removal failed");
                self.finish(UploadPhase::Error(e.user_message()));
            }
        }

        result
    }

    async fn run_upload(&mut self, file: &CandidateFile) -> Result<String, UploadError> {
        validate_image(file)?;

        self.transition(UploadPhase::Uploading);
        self.preview.show_tentative(file);

        let (user, credentials) = self.signed_in_user().ok_or(UploadError::Unauthenticated)?;

        let stored = self
            .storage
            .upload(&user.id, file)
            .await
            .map_err(UploadError::StorageUpload)?;

        if let Err(e) = self.records.set_image(&credentials, &stored.url).await {
            tracing::warn!(
                key = %stored.key,
                url = %stored.url,
                "Backend did not accept the new image; stored object is orphaned"
            );
            return Err(e.into());
        }

        self.preview.commit(&stored.url);
        self.sync_identity(IdentityPatch::profile_image(stored.url.as_str()));
        (self.on_image_change)(&stored.url);
        self.identity.notify_profile_updated();

        Ok(stored.url)
    }

    async fn run_remove(&mut self) -> Result<(), UploadError> {
        let (_, credentials) = self.signed_in_user().ok_or(UploadError::Unauthenticated)?;

        let location = self
            .preview
            .confirmed_url()
            .map(str::to_owned)
            .ok_or(UploadError::NothingToRemove)?;

        self.storage
            .delete(&location)
            .await
            .map_err(UploadError::from_delete)?;

        if let Err(e) = self.records.clear_image(&credentials).await {
            tracing::warn!(
                url = %location,
                "Stored object deleted but backend still references it"
            );
            return Err(e.into());
        }

        self.sync_identity(IdentityPatch::profile_image(""));
        self.preview.clear();
        (self.on_image_change)("");
        self.identity.notify_profile_updated();

        Ok(())
    }

    fn signed_in_user(&self) -> Option<(UserIdentity, AuthCredentials)> {
        let user = match self.identity.current() {
            Ok(user) => user?,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read cached identity");
                return None;
            }
        };
        let credentials = user.credentials()?;
        Some((user, credentials))
    }

    /// The backend already holds the change; a cache write failure only means the
    /// next render shows stale data until the identity is re-fetched.
    fn sync_identity(&self, patch: IdentityPatch) {
        if let Err(e) = self.identity.update(&patch) {
            tracing::warn!(error = %e, "Failed to update cached identity");
        }
    }

    fn transition(&self, phase: UploadPhase) {
        tracing::debug!(phase = ?phase, "Upload phase transition");
        self.session.send_modify(|s| s.phase = phase);
    }

    fn finish(&self, phase: UploadPhase) {
        tracing::debug!(phase = ?phase, "Upload phase transition");
        self.session.send_modify(|s| {
            s.phase = phase;
            s.selected_file = None;
        });
    }
}

use profile_image_api_client::ProfileApiError;
use profile_image_core::ValidationError;
use profile_image_storage::StorageError;
use thiserror::Error;

/// Everything that can end an upload or removal early.
///
/// The uploader turns each of these into the `Error` phase; its `Display` text is
/// the message shown to the user.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Authentication information is missing.")]
    Unauthenticated,

    #[error("Failed to upload the image: {0}")]
    StorageUpload(#[source] StorageError),

    #[error("Failed to delete the image from storage.")]
    StorageDelete(#[source] StorageError),

    #[error("The image URL does not match the storage bucket.")]
    UrlMismatch { url: String },

    #[error("{message}")]
    ServerRejected { status: Option<u16>, message: String },

    #[error("Failed to reach the server.")]
    BackendUnavailable(#[source] ProfileApiError),

    #[error("There is no profile image to remove.")]
    NothingToRemove,
}

impl UploadError {
    pub(crate) fn from_delete(error: StorageError) -> Self {
        match error {
            StorageError::UrlMismatch { url, .. } => UploadError::UrlMismatch { url },
            other => UploadError::StorageDelete(other),
        }
    }

    /// Short text for the error banner.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<ProfileApiError> for UploadError {
    fn from(error: ProfileApiError) -> Self {
        match error {
            ProfileApiError::ServerRejected { status, message } => UploadError::ServerRejected {
                status: Some(status),
                message,
            },
            other => UploadError::BackendUnavailable(other),
        }
    }
}

//! Profile Image Sync
//!
//! Orchestrates attaching, replacing and removing a user's profile image across
//! three independently failing resources: the object store holding the image,
//! the backend record pointing at it and the locally cached identity.
//!
//! [`ProfileImageUploader`] drives the flow and publishes its [`UploadSession`]
//! state; [`PreviewSlot`] owns the optimistic preview; [`IdentityCache`] keeps the
//! local identity in step with the backend and broadcasts [`ProfileUpdated`].

pub mod error;
pub mod identity;
pub mod preview;
pub mod state;
pub mod uploader;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::UploadError;
pub use identity::{
    FileIdentityStore, IdentityCache, IdentityError, IdentityStore, MemoryIdentityStore,
    ProfileUpdated,
};
pub use preview::{
    MemoryPreviewManager, PreviewManager, PreviewReference, PreviewSlot, TempFilePreviewManager,
};
pub use state::{UploadPhase, UploadSession};
pub use uploader::ProfileImageUploader;

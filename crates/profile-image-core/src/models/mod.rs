pub mod file;
pub mod identity;

pub use file::CandidateFile;
pub use identity::{resolve_image_url, AuthCredentials, IdentityPatch, UserIdentity};

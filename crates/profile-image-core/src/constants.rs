/// Largest accepted profile image, in bytes (5 MiB).
pub const MAX_PROFILE_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Media type prefix every accepted upload must declare.
pub const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

/// Prefix of every profile image storage key: `images/{user_id}/{file_name}`.
pub const IMAGE_KEY_PREFIX: &str = "images";

/// Backend route that stores or clears the profile image reference.
pub const PROFILE_IMAGE_ROUTE: &str = "/api/users/profile-imageURL";

pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";
pub const SESSION_ID_HEADER: &str = "x-session-id";

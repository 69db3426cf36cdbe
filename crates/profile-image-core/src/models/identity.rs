use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Locally persisted snapshot of the signed-in user.
///
/// Mirrors the backend's user payload. Fields this crate does not know about are
/// kept in `extra` so rewriting `profileImage` never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub session_id: String,
    /// Stored image URL, or empty for "no custom image".
    #[serde(default)]
    pub profile_image: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserIdentity {
    /// Credentials for the backend, or `None` when the user holds no token.
    pub fn credentials(&self) -> Option<AuthCredentials> {
        if self.token.is_empty() {
            return None;
        }
        Some(AuthCredentials {
            token: self.token.clone(),
            session_id: self.session_id.clone(),
        })
    }

    pub fn profile_image(&self) -> Option<&str> {
        if self.profile_image.is_empty() {
            None
        } else {
            Some(&self.profile_image)
        }
    }

    pub fn apply(&mut self, patch: &IdentityPatch) {
        if let Some(profile_image) = &patch.profile_image {
            self.profile_image = profile_image.clone();
        }
    }
}

/// Token and session pair sent as `x-auth-token` / `x-session-id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCredentials {
    pub token: String,
    pub session_id: String,
}

/// Partial update merged into the cached identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityPatch {
    pub profile_image: Option<String>,
}

impl IdentityPatch {
    pub fn profile_image(value: impl Into<String>) -> Self {
        Self {
            profile_image: Some(value.into()),
        }
    }
}

/// Turn a stored image reference into a displayable URL.
///
/// Absolute references are returned as-is; anything else is a path served by the
/// backend and gets the API base prepended. Empty references resolve to `None`.
pub fn resolve_image_url(api_url: &str, reference: &str) -> Option<String> {
    if reference.is_empty() {
        return None;
    }
    if reference.starts_with("http") {
        return Some(reference.to_string());
    }
    Some(format!("{}{}", api_url.trim_end_matches('/'), reference))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_keeps_unknown_fields() {
        let raw = r#"{"id":"u1","token":"t","sessionId":"s","profileImage":"","name":"Kim","email":"kim@example.com"}"#;
        let mut identity: UserIdentity = serde_json::from_str(raw).unwrap();
        identity.apply(&IdentityPatch::profile_image("https://cdn/x.png"));

        let written: Value = serde_json::to_value(&identity).unwrap();
        assert_eq!(written["profileImage"], "https://cdn/x.png");
        assert_eq!(written["sessionId"], "s");
        assert_eq!(written["name"], "Kim");
        assert_eq!(written["email"], "kim@example.com");
    }

    #[test]
    fn test_credentials_require_token() {
        let mut identity = UserIdentity {
            id: "u1".to_string(),
            session_id: "s".to_string(),
            ..Default::default()
        };
        assert!(identity.credentials().is_none());

        identity.token = "t".to_string();
        let credentials = identity.credentials().unwrap();
        assert_eq!(credentials.token, "t");
        assert_eq!(credentials.session_id, "s");
    }

    #[test]
    fn test_empty_patch_is_noop() {
        let mut identity = UserIdentity {
            profile_image: "https://cdn/a.png".to_string(),
            ..Default::default()
        };
        identity.apply(&IdentityPatch::default());
        assert_eq!(identity.profile_image(), Some("https://cdn/a.png"));
    }

    #[test]
    fn test_resolve_image_url() {
        assert_eq!(resolve_image_url("http://api", ""), None);
        assert_eq!(
            resolve_image_url("http://api/", "/uploads/a.png").as_deref(),
            Some("http://api/uploads/a.png")
        );
        assert_eq!(
            resolve_image_url("http://api", "https://bucket.s3.region.amazonaws.com/images/u1/a.png")
                .as_deref(),
            Some("https://bucket.s3.region.amazonaws.com/images/u1/a.png")
        );
    }
}

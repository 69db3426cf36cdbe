//! HTTP client for the backend's profile image record.
//!
//! The backend owns the user's `profileImage` reference; this client sets and
//! clears it with the `x-auth-token` / `x-session-id` headers of the signed-in
//! user. Domain methods live in [`records`].

pub mod records;

use profile_image_core::constants::{AUTH_TOKEN_HEADER, SESSION_ID_HEADER};
use profile_image_core::{AuthCredentials, ProfileImageConfig};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

pub use records::ProfileRecords;

#[derive(Debug, Error)]
pub enum ProfileApiError {
    /// Non-2xx answer; `message` comes from the body's `message` field when present.
    #[error("{message}")]
    ServerRejected { status: u16, message: String },

    #[error("Failed to reach the server: {0}")]
    Request(#[from] reqwest::Error),
}

impl ProfileApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ProfileApiError::ServerRejected { status, .. } => Some(*status),
            ProfileApiError::Request(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the backend API.
#[derive(Clone, Debug)]
pub struct ProfileApiClient {
    client: Client,
    base_url: String,
}

impl ProfileApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProfileApiError> {
        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ProfileImageConfig) -> Result<Self, ProfileApiError> {
        Self::new(config.api_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder, credentials: &AuthCredentials) -> RequestBuilder {
        request
            .header(AUTH_TOKEN_HEADER, credentials.token.as_str())
            .header(SESSION_ID_HEADER, credentials.session_id.as_str())
    }

    /// Send the request and map any non-2xx status to `ServerRejected`.
    async fn send(
        &self,
        request: RequestBuilder,
        credentials: &AuthCredentials,
        fallback_message: &str,
    ) -> Result<Response, ProfileApiError> {
        let response = self.apply_auth(request, credentials).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback_message.to_string());

        tracing::warn!(status = status.as_u16(), message = %message, "Backend rejected request");

        Err(ProfileApiError::ServerRejected {
            status: status.as_u16(),
            message,
        })
    }
}

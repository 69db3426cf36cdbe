//! Profile image record endpoints.
//!
//! `POST` and `DELETE` on `/api/users/profile-imageURL`.

use crate::{ProfileApiClient, ProfileApiError};
use async_trait::async_trait;
use profile_image_core::constants::PROFILE_IMAGE_ROUTE;
use profile_image_core::AuthCredentials;
use serde::Serialize;

const SET_IMAGE_FALLBACK: &str = "Server request failed.";
const CLEAR_IMAGE_FALLBACK: &str = "Failed to delete the image.";

/// Backend record of the user's profile image reference.
#[async_trait]
pub trait ProfileRecords: Send + Sync {
    /// Point the user's record at `location`.
    async fn set_image(
        &self,
        credentials: &AuthCredentials,
        location: &str,
    ) -> Result<(), ProfileApiError>;

    /// Clear the user's stored reference.
    async fn clear_image(&self, credentials: &AuthCredentials) -> Result<(), ProfileApiError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SetProfileImageRequest<'a> {
    profile_image: &'a str,
}

#[async_trait]
impl ProfileRecords for ProfileApiClient {
    async fn set_image(
        &self,
        credentials: &AuthCredentials,
        location: &str,
    ) -> Result<(), ProfileApiError> {
        let url = self.build_url(PROFILE_IMAGE_ROUTE);
        let request = self.client.post(&url).json(&SetProfileImageRequest {
            profile_image: location,
        });

        self.send(request, credentials, SET_IMAGE_FALLBACK).await?;
        tracing::info!(location = %location, "Profile image reference stored");
        Ok(())
    }

    async fn clear_image(&self, credentials: &AuthCredentials) -> Result<(), ProfileApiError> {
        let url = self.build_url(PROFILE_IMAGE_ROUTE);
        let request = self.client.delete(&url);

        self.send(request, credentials, CLEAR_IMAGE_FALLBACK).await?;
        tracing::info!("Profile image reference cleared");
        Ok(())
    }
}

//! # Spotify Integration Module
//!
//! HTTP layer between genrelist and the Spotify accounts service / Web API.
//!
//! ```text
//! Application Layer (api handlers, CLI)
//!          ↓
//! Management Layer (sessions, authorization, search-and-build)
//!          ↓
//! MusicService trait  ←  SpotifyClient (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! The management layer only sees the [`MusicService`] trait so the
//! search-and-build sequence can be exercised against a recording fake.
//!
//! ## Submodules
//!
//! - [`auth`] - consent URL construction and authorization code redemption
//! - [`search`] - track search
//! - [`playlist`] - current user lookup, playlist creation, adding items
//!
//! ## API Coverage
//!
//! - `POST /api/token` - authorization code exchange (client secret, basic auth)
//! - `GET /search` - track search
//! - `GET /me` - current user profile
//! - `POST /users/{user_id}/playlists` - create playlist
//! - `POST /playlists/{playlist_id}/tracks` - add tracks
//!
//! None of the calls retry. Every failure is returned to the caller, which
//! decides what to report.

pub mod auth;
pub mod playlist;
pub mod search;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::{Credentials, SpotifyEndpoints},
    error::ServiceError,
    types::{
        AddTrackToPlaylistResponse, CreatePlaylistRequest, CreatePlaylistResponse, CurrentUser,
        TokenPair, TrackObject,
    },
};

/// Remote operations the application needs from the music service.
#[async_trait]
pub trait MusicService: Send + Sync {
    /// Redeems a one-time authorization code for a token pair.
    async fn exchange_authorization_code(&self, code: &str) -> Result<TokenPair, ServiceError>;

    async fn current_user(&self, token: &TokenPair) -> Result<CurrentUser, ServiceError>;

    /// Runs one track search, returning at most `limit` raw results.
    async fn search_tracks(
        &self,
        token: &TokenPair,
        query: &str,
        limit: u32,
    ) -> Result<Vec<TrackObject>, ServiceError>;

    async fn create_playlist(
        &self,
        token: &TokenPair,
        owner_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, ServiceError>;

    /// Appends `uris` to the playlist in a single request.
    async fn add_items(
        &self,
        token: &TokenPair,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<AddTrackToPlaylistResponse, ServiceError>;
}

/// [`MusicService`] backed by the real Spotify endpoints.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    credentials: Credentials,
    endpoints: SpotifyEndpoints,
}

impl SpotifyClient {
    pub fn new(credentials: Credentials, endpoints: SpotifyEndpoints) -> Self {
        Self {
            http: Client::new(),
            credentials,
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &SpotifyEndpoints {
        &self.endpoints
    }

    fn api(&self, path: &str) -> String {
        format!(
            "{base}/{path}",
            base = self.endpoints.api_url.trim_end_matches('/'),
            path = path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl MusicService for SpotifyClient {
    async fn exchange_authorization_code(&self, code: &str) -> Result<TokenPair, ServiceError> {
        self.exchange_code(code).await
    }

    async fn current_user(&self, token: &TokenPair) -> Result<CurrentUser, ServiceError> {
        self.me(token).await
    }

    async fn search_tracks(
        &self,
        token: &TokenPair,
        query: &str,
        limit: u32,
    ) -> Result<Vec<TrackObject>, ServiceError> {
        self.search(token, query, limit).await
    }

    async fn create_playlist(
        &self,
        token: &TokenPair,
        owner_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, ServiceError> {
        self.create(token, owner_id, request).await
    }

    async fn add_items(
        &self,
        token: &TokenPair,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<AddTrackToPlaylistResponse, ServiceError> {
        self.add_tracks(token, playlist_id, uris).await
    }
}

/// Turns a non-success response into a [`ServiceError`] carrying Spotify's message.
async fn check(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    });

    if status == StatusCode::UNAUTHORIZED {
        Err(ServiceError::Unauthorized(message))
    } else {
        Err(ServiceError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let response = check(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))
}

/// Extracts a readable message from either error shape Spotify uses:
/// `{"error": {"status": 400, "message": "..."}}` on the Web API and
/// `{"error": "invalid_grant", "error_description": "..."}` on the token endpoint.
fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    match &json["error"] {
        Value::Object(inner) => inner
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        Value::String(code) => Some(
            json["error_description"]
                .as_str()
                .map(|desc| format!("{}: {}", code, desc))
                .unwrap_or_else(|| code.clone()),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_api_error_shape() {
        let body = r#"{"error":{"status":400,"message":"No search query"}}"#;
        assert_eq!(error_message(body).as_deref(), Some("No search query"));
    }

    #[test]
    fn token_endpoint_error_shape() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid authorization code"}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("invalid_grant: Invalid authorization code")
        );
    }

    #[test]
    fn non_json_body_has_no_message() {
        assert_eq!(error_message("<html>bad gateway</html>"), None);
    }
}

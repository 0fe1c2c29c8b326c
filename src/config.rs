//! Configuration management for genrelist.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. The configuration system follows a
//! hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. `.env` file in the working directory
//! 4. Application defaults (where applicable)
//!
//! Everything is read once into [`Settings`] at startup; the rest of the
//! application never touches the environment directly.

use std::{env, fmt, path::PathBuf, time::Duration};

use crate::{error::AppError, query::ArtistPolicy, warning};

pub const DEFAULT_SCOPE: &str = "playlist-modify-public playlist-modify-private";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8501";
pub const DEFAULT_PLAYLIST_DESCRIPTION: &str = "Created with genrelist";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// Loads environment variables from `.env` files.
///
/// Looks for `genrelist/.env` in the platform-specific local data directory
/// and then for `.env` in the working directory. Missing files are fine:
/// variables may come from the process environment alone. Values that are
/// already set are never overwritten.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/genrelist/.env`
/// - macOS: `~/Library/Application Support/genrelist/.env`
/// - Windows: `%LOCALAPPDATA%/genrelist/.env`
///
/// # Errors
///
/// Returns an error string if the data directory cannot be created.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("genrelist/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        if let Err(e) = dotenv::from_path(&path) {
            warning!("Ignoring unreadable {}: {}", path.display(), e);
        }
    }
    dotenv::dotenv().ok();

    Ok(())
}

/// App-level identity issued by Spotify.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scope: String,
}

impl Credentials {
    /// Reads the credentials from the environment.
    ///
    /// # Errors
    ///
    /// [`AppError::ConfigurationMissing`] naming the first absent variable.
    pub fn from_env() -> Result<Self, AppError> {
        let credentials = Self {
            client_id: required("SPOTIFY_CLIENT_ID")?,
            client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            redirect_uri: required("SPOTIFY_REDIRECT_URI")?,
            scope: optional("SPOTIFY_SCOPE", DEFAULT_SCOPE),
        };
        credentials.ensure_complete()?;
        Ok(credentials)
    }

    /// Fails when any value needed to build a consent URL is blank.
    pub fn ensure_complete(&self) -> Result<(), AppError> {
        let fields = [
            ("SPOTIFY_CLIENT_ID", &self.client_id),
            ("SPOTIFY_CLIENT_SECRET", &self.client_secret),
            ("SPOTIFY_REDIRECT_URI", &self.redirect_uri),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((key, _)) => Err(AppError::ConfigurationMissing(key.to_string())),
            None => Ok(()),
        }
    }
}

// The secret must never end up in logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Base URLs of the Spotify accounts service and Web API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
}

impl Default for SpotifyEndpoints {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl SpotifyEndpoints {
    pub fn from_env() -> Self {
        Self {
            auth_url: spotify_apiauth_url(),
            token_url: spotify_apitoken_url(),
            api_url: spotify_apiurl(),
        }
    }
}

/// Immutable runtime settings assembled once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub endpoints: SpotifyEndpoints,
    pub server_addr: String,
    pub artist_policy: ArtistPolicy,
    pub playlist_description: String,
    pub session_ttl: Duration,
}

impl Settings {
    /// Reads all settings from the environment.
    ///
    /// # Errors
    ///
    /// Missing credentials are reported as [`AppError::ConfigurationMissing`];
    /// the caller is expected to halt.
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            credentials: Credentials::from_env()?,
            endpoints: SpotifyEndpoints::from_env(),
            server_addr: server_addr(),
            artist_policy: artist_policy(),
            playlist_description: playlist_description(),
            session_ttl: session_ttl(),
        })
    }
}

/// Returns the address the web server binds to, e.g. `127.0.0.1:8501`.
pub fn server_addr() -> String {
    optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Returns the Spotify OAuth authorization URL.
pub fn spotify_apiauth_url() -> String {
    optional("SPOTIFY_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Returns the Spotify OAuth token exchange URL.
pub fn spotify_apitoken_url() -> String {
    optional("SPOTIFY_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// Returns the Spotify Web API base URL without a trailing slash.
pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL", DEFAULT_API_URL)
        .trim_end_matches('/')
        .to_string()
}

/// Returns how comma-separated artist input is turned into query clauses.
///
/// Unknown values fall back to [`ArtistPolicy::AnyOf`] with a warning.
pub fn artist_policy() -> ArtistPolicy {
    let raw = optional("SEARCH_ARTIST_POLICY", "any");
    raw.parse().unwrap_or_else(|e| {
        warning!("{}; using 'any'", e);
        ArtistPolicy::default()
    })
}

/// Returns the description given to every created playlist.
pub fn playlist_description() -> String {
    optional("PLAYLIST_DESCRIPTION", DEFAULT_PLAYLIST_DESCRIPTION)
}

/// Returns how long an idle browser session is kept.
pub fn session_ttl() -> Duration {
    let secs = optional("SESSION_TTL_SECS", "")
        .parse::<u64>()
        .unwrap_or(DEFAULT_SESSION_TTL_SECS);
    Duration::from_secs(secs)
}

fn required(key: &str) -> Result<String, AppError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(AppError::ConfigurationMissing(key.to_string())),
    }
}

fn optional(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default.to_string(),
    }
}

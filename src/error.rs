//! Error types shared by the authorization, search and playlist layers.
//!
//! [`ServiceError`] describes what went wrong while talking to Spotify.
//! [`AppError`] is what the page and the CLI report to the user; it names the
//! step that failed so a partial run can be explained precisely.

use std::fmt;

use thiserror::Error;

/// A remote call in the search-and-build sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Search,
    CurrentUser,
    CreatePlaylist,
    AddItems,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Search => "track search",
            Step::CurrentUser => "user lookup",
            Step::CreatePlaylist => "playlist creation",
            Step::AddItems => "adding tracks",
        };
        f.write_str(name)
    }
}

/// Failure of a single HTTP round-trip to the music service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Connection failures, timeouts, TLS problems.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with HTTP 401.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Any other non-success status.
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },

    /// The body could not be decoded into the expected shape.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Everything the user can be told about a failed interaction.
#[derive(Error, Debug)]
pub enum AppError {
    /// A required setting is absent. Fatal at startup.
    #[error("missing configuration value {0}")]
    ConfigurationMissing(String),

    /// A setting is present but unusable.
    #[error("invalid configuration value {key}: {reason}")]
    ConfigurationInvalid { key: String, reason: String },

    /// Code redemption was rejected or the redirect could not be trusted.
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    /// The session never completed authorization.
    #[error("connect your Spotify account first")]
    NotAuthorized,

    /// Detected locally before a call was attempted.
    #[error("your Spotify session has expired, please authorize again")]
    TokenExpired,

    /// The service refused the access token mid-flow.
    #[error("Spotify rejected the access token during {step}, please authorize again")]
    TokenRejected { step: Step },

    #[error("enter a genre or at least one artist to search for")]
    NoCriteria,

    #[error("the number of tracks must be between 1 and 30, got {0}")]
    InvalidResultCount(String),

    #[error("enter a name for the playlist")]
    MissingPlaylistName,

    #[error("{step} failed: {message}")]
    RemoteCallFailed { step: Step, message: String },
}

impl AppError {
    /// Maps a transport failure at `step` into the user-facing taxonomy.
    pub fn from_service(step: Step, err: ServiceError) -> Self {
        match err {
            ServiceError::Unauthorized(_) => AppError::TokenRejected { step },
            other => AppError::RemoteCallFailed {
                step,
                message: other.to_string(),
            },
        }
    }

    /// Whether the session token must be dropped after this error.
    pub fn clears_token(&self) -> bool {
        matches!(self, AppError::TokenExpired | AppError::TokenRejected { .. })
    }
}

use chrono::Utc;
use url::Url;

use crate::{
    config::Credentials,
    error::{AppError, ServiceError},
    types::{TokenPair, TokenResponse},
};

use super::{SpotifyClient, decode};

/// Builds the consent URL the user must visit.
///
/// The URL carries the client id, the requested scopes, the redirect URI and
/// the anti-forgery `state`. All values are percent-encoded.
///
/// # Errors
///
/// - [`AppError::ConfigurationMissing`] when client id, secret or redirect URI is blank
/// - [`AppError::ConfigurationInvalid`] when `auth_url` is not a valid URL
///
/// # Example
///
/// ```
/// let url = authorization_url(&credentials, "https://accounts.spotify.com/authorize", "xyz")?;
/// ```
pub fn authorization_url(
    credentials: &Credentials,
    auth_url: &str,
    state: &str,
) -> Result<String, AppError> {
    credentials.ensure_complete()?;

    let url = Url::parse_with_params(
        auth_url,
        &[
            ("client_id", credentials.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", credentials.redirect_uri.as_str()),
            ("scope", credentials.scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| AppError::ConfigurationInvalid {
        key: "SPOTIFY_AUTH_URL".to_string(),
        reason: e.to_string(),
    })?;

    Ok(url.into())
}

impl SpotifyClient {
    /// Exchanges an authorization code for an access/refresh token pair.
    ///
    /// Uses the confidential-client variant of the flow: the client id and
    /// secret are sent as HTTP basic auth, the code and redirect URI as form
    /// fields. The code is single use; redeeming it twice fails remotely with
    /// `invalid_grant`, which is why callers track redeemed codes.
    pub(crate) async fn exchange_code(&self, code: &str) -> Result<TokenPair, ServiceError> {
        let res = self
            .http
            .post(&self.endpoints.token_url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        let response: TokenResponse = decode(res).await?;
        Ok(TokenPair::from_response(response, Utc::now()))
    }
}

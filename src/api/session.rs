use axum::http::{HeaderMap, header};

use crate::management::SESSION_COOKIE;

/// Session id from the request's `Cookie` header(s), if any.
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value binding the browser to `session_id`.
///
/// `SameSite=Lax` keeps the cookie on the top-level redirect back from Spotify.
pub fn session_cookie(session_id: &str) -> String {
    format!(
        "{name}={id}; Path=/; HttpOnly; SameSite=Lax",
        name = SESSION_COOKIE,
        id = session_id
    )
}

//! # API Module
//!
//! HTTP handlers of the genrelist web page.
//!
//! ## Endpoints
//!
//! - [`page`] - `GET /` (and `GET /callback`): renders the page; when Spotify
//!   redirects back with `?code=...&state=...` the code is redeemed first and
//!   the browser is sent to the clean URL.
//! - [`submit`] - `POST /`: validates the form and runs the search-and-build flow.
//! - [`logout`] - `GET /logout`: drops the session token.
//! - [`health`] - `GET /health`: status and version for monitoring.
//!
//! ## Sessions
//!
//! Each browser is identified by an opaque `genrelist_session` cookie. The
//! token pair lives in the in-memory session store only, never in the cookie.

mod health;
mod logout;
mod page;
pub mod render;
mod session;
mod submit;

pub use health::health;
pub use logout::logout;
pub use page::RedirectParams;
pub use page::page;
pub use session::session_cookie;
pub use session::session_from_headers;
pub use submit::submit;

use axum::{
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::server::AppState;

use render::{PageView, render_page};

/// Renders `view` for `session_id`, adding the consent link when the session
/// has no usable token.
async fn respond(app: &AppState, session_id: &str, mut view: PageView) -> Response {
    view.authorized = app.auth.current_token(session_id).await.is_some();
    if !view.authorized {
        match app.auth.build_authorization_url(session_id).await {
            Ok(url) => view.auth_url = Some(url),
            Err(e) => view.error(e),
        }
    }

    (
        [(header::SET_COOKIE, session_cookie(session_id))],
        Html(render_page(&view)),
    )
        .into_response()
}

fn redirect_home(session_id: &str) -> Response {
    (
        [(header::SET_COOKIE, session_cookie(session_id))],
        Redirect::to("/"),
    )
        .into_response()
}

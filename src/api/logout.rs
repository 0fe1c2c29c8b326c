use axum::{extract::State, http::HeaderMap, response::Response};

use crate::server::AppState;

use super::{redirect_home, session};

/// `GET /logout` - forgets the session's token.
pub async fn logout(State(app): State<AppState>, headers: HeaderMap) -> Response {
    let cookie = session::session_from_headers(&headers);
    let session_id = app.auth.sessions().open(cookie.as_deref()).await;
    app.auth.invalidate(&session_id).await;
    redirect_home(&session_id)
}

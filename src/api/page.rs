use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Response,
};
use serde::Deserialize;

use crate::{error::AppError, server::AppState};

use super::{redirect_home, render::PageView, respond, session};

/// Query parameters Spotify appends when redirecting back after consent.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// `GET /` - renders the page, redeeming an authorization code first if one
/// arrived with the request.
///
/// The redirect is only honoured for the browser session that asked for
/// consent (or a headless terminal session). After a successful exchange the
/// browser is redirected to the clean URL so a reload never redeems the code
/// again.
pub async fn page(
    State(app): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<RedirectParams>,
) -> Response {
    let cookie = session::session_from_headers(&headers);
    let session_id = app.auth.sessions().open(cookie.as_deref()).await;
    let mut view = PageView::default();

    if let Some(reason) = params.error.as_deref() {
        app.auth
            .record_failure(params.state.as_deref(), &session_id, reason)
            .await;
        view.error(AppError::AuthorizationFailed(format!(
            "Spotify answered '{}'",
            reason
        )));
    } else if let Some(code) = params.code.as_deref() {
        if app.auth.has_redeemed(&session_id, code).await {
            return redirect_home(&session_id);
        }
        match app
            .auth
            .resolve_redirect(params.state.as_deref(), &session_id)
            .await
        {
            Ok(owner) => match app
                .auth
                .exchange_code(app.service.as_ref(), &owner, code)
                .await
            {
                Ok(_) if owner == session_id => return redirect_home(&session_id),
                Ok(_) => view.info("Spotify authorization complete, you can return to the terminal."),
                Err(e) => view.error(e),
            },
            Err(e) => view.error(e),
        }
    }

    respond(&app, &session_id, view).await
}

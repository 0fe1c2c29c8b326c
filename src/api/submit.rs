use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::Response,
};

use crate::{
    error::AppError,
    management::{AuthState, BuildOutcome, PlaylistBuilder, PlaylistSpec},
    query::{ResultCount, SearchQuery},
    server::AppState,
};

use super::{
    render::{PageView, SearchForm},
    respond, session,
};

/// `POST /` - validates the form, checks the session token and runs the
/// search-and-build flow.
pub async fn submit(
    State(app): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SearchForm>,
) -> Response {
    let cookie = session::session_from_headers(&headers);
    let session_id = app.auth.sessions().open(cookie.as_deref()).await;
    let mut view = PageView::with_form(form.clone());

    match build(&app, &session_id, &form, &mut view).await {
        Ok(outcome) => {
            if outcome.clears_token() {
                app.auth.invalidate(&session_id).await;
            }
            view.outcome(outcome)
        }
        Err(e) => {
            if e.clears_token() {
                app.auth.invalidate(&session_id).await;
            }
            view.error(e);
        }
    }

    respond(&app, &session_id, view).await
}

async fn build(
    app: &AppState,
    session_id: &str,
    form: &SearchForm,
    view: &mut PageView,
) -> Result<BuildOutcome, AppError> {
    let policy = app.settings.artist_policy;

    let count = ResultCount::parse(&form.count)?;
    let query = SearchQuery::new(form.genre.as_str(), form.artist.as_str(), count);
    if query.build(policy).is_none() {
        return Err(AppError::NoCriteria);
    }
    let playlist = PlaylistSpec::new(&form.playlist_name)?
        .description(app.settings.playlist_description.clone());

    let token = match app.auth.current_token(session_id).await {
        Some(token) => token,
        None => {
            return Err(match app.auth.auth_state(session_id).await {
                AuthState::Unauthenticated => AppError::NotAuthorized,
                _ => AppError::TokenExpired,
            });
        }
    };

    view.info(query.describe(policy));
    PlaylistBuilder::new(app.service.as_ref(), policy)
        .search_and_create(&token, &query, &playlist)
        .await
}

use axum::{Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tower_http::trace::TraceLayer;

use crate::{
    Res, api,
    config::Settings,
    management::{AuthorizationManager, SessionStore},
    spotify::{MusicService, SpotifyClient},
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthorizationManager,
    pub service: Arc<dyn MusicService>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// State talking to the real Spotify endpoints from `settings`.
    pub fn new(settings: Settings) -> Self {
        let service = SpotifyClient::new(settings.credentials.clone(), settings.endpoints.clone());
        Self::with_service(settings, Arc::new(service))
    }

    pub fn with_service(settings: Settings, service: Arc<dyn MusicService>) -> Self {
        let sessions = SessionStore::new(settings.session_ttl);
        let auth = AuthorizationManager::new(
            settings.credentials.clone(),
            settings.endpoints.clone(),
            sessions,
        );
        Self {
            auth,
            service,
            settings: Arc::new(settings),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::page).post(api::submit))
        .route("/callback", get(api::page))
        .route("/logout", get(api::logout))
        .route("/health", get(api::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `settings.server_addr` and serves the page until the process ends.
pub async fn start_api_server(state: AppState) -> Res<()> {
    let addr = SocketAddr::from_str(&state.settings.server_addr)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "web server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

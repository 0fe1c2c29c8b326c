use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;
use tokio::task::JoinHandle;

use crate::{
    error, info,
    management::{
        AuthProgress, AuthorizationManager, BuildOutcome, PartialReason, PlaylistBuilder,
        PlaylistSpec,
    },
    query::{ResultCount, SearchQuery},
    server::{self, AppState},
    success,
    types::{TokenPair, TrackTableRow},
    utils, warning,
};

use super::load_settings;

const AUTH_TIMEOUT: Duration = Duration::from_secs(120);

/// Arguments of `genrelist create`.
#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub count: i64,
    pub name: Option<String>,
    pub private: bool,
    pub description: Option<String>,
}

/// Searches and builds a playlist from the terminal.
///
/// The input is validated before anything else happens. Then the callback
/// server is started in the background, the consent URL is opened in the
/// browser and the command waits until the redirect has been redeemed for
/// the headless session created here. The `state` parameter ties the
/// browser's redirect back to this session even though the browser holds no
/// cookie for it. A failed or denied authorization ends the wait at once.
pub async fn create(opts: CreateOptions) {
    let settings = load_settings();
    let policy = settings.artist_policy;

    let count = match ResultCount::new(opts.count) {
        Ok(count) => count,
        Err(e) => error!("{}", e),
    };
    let query = SearchQuery::new(
        opts.genre.clone().unwrap_or_default(),
        opts.artist.clone().unwrap_or_default(),
        count,
    );
    if query.build(policy).is_none() {
        error!("Pass --genre, --artist or both.");
    }

    let name = opts
        .name
        .clone()
        .unwrap_or_else(|| utils::default_playlist_name(&query.genre().unwrap_or_default()));
    let spec = match PlaylistSpec::new(&name) {
        Ok(spec) => spec
            .public(!opts.private)
            .description(
                opts.description
                    .clone()
                    .unwrap_or_else(|| settings.playlist_description.clone()),
            ),
        Err(e) => error!("{}", e),
    };

    let app = AppState::new(settings);
    let server_state = app.clone();
    let callback = tokio::spawn(async move {
        if let Err(e) = server::start_api_server(server_state).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    let session = app.auth.sessions().open_headless().await;
    let auth_url = match app.auth.build_authorization_url(&session).await {
        Ok(url) => url,
        Err(e) => error!("Cannot build the authorization URL: {}", e),
    };

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = match wait_for_token(&app.auth, &session, &callback).await {
        Ok(token) => token,
        Err(reason) => error!("Authorization failed: {}", reason),
    };
    success!("Authorization successful!");

    info!("{}", query.describe(policy));
    let builder = PlaylistBuilder::new(app.service.as_ref(), policy);
    match builder.search_and_create(&token, &query, &spec).await {
        Ok(outcome) => report(&outcome),
        Err(e) => error!("{}", e),
    }
}

/// Polls the session until it holds a usable token, the authorization fails,
/// the callback server stops or the timeout passes.
async fn wait_for_token(
    auth: &AuthorizationManager,
    session: &str,
    server: &JoinHandle<()>,
) -> Result<TokenPair, String> {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb.set_message("Waiting for Spotify authorization in the browser...");

    let start = Instant::now();
    let outcome = loop {
        match auth.progress(session).await {
            AuthProgress::Ready(token) => break Ok(token),
            AuthProgress::Failed(reason) => break Err(reason),
            AuthProgress::Pending => {}
        }
        if server.is_finished() {
            break Err("the callback server is not running".to_string());
        }
        if start.elapsed() >= AUTH_TIMEOUT {
            break Err(format!(
                "no answer from the browser within {} seconds",
                AUTH_TIMEOUT.as_secs()
            ));
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    };

    pb.finish_and_clear();
    outcome
}

fn report(outcome: &BuildOutcome) {
    info!("Query sent: {}", outcome.query());

    let rows: Vec<TrackTableRow> = outcome
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, t)| TrackTableRow::from_track(i + 1, t))
        .collect();
    if !rows.is_empty() {
        println!("{}", Table::new(rows));
    }

    match outcome {
        BuildOutcome::NoMatches { .. } => {
            warning!("No tracks on Spotify match these criteria, so no playlist was created.")
        }
        BuildOutcome::Created {
            playlist, added, ..
        } => {
            success!(
                "Playlist '{}' created with {} tracks: {}",
                playlist.name,
                added,
                playlist.url
            )
        }
        BuildOutcome::PartialPlaylistCreated {
            playlist, reason, ..
        } => {
            let why = match reason {
                PartialReason::NoEligibleUris => "none of the tracks could be added".to_string(),
                PartialReason::AddFailed(message) => message.clone(),
                PartialReason::TokenRejected => {
                    "Spotify rejected the access token while adding tracks".to_string()
                }
                PartialReason::TokenExpired => {
                    "the access token expired before the tracks were added".to_string()
                }
            };
            warning!(
                "Playlist '{}' was created, but {}: {}",
                playlist.name,
                why,
                playlist.url
            )
        }
    }
}

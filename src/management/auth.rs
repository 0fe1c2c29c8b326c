use crate::{
    config::{Credentials, SpotifyEndpoints},
    error::AppError,
    spotify::{self, MusicService},
    types::TokenPair,
    utils,
};

use super::session::{AuthState, SessionStore};

/// See [`AuthorizationManager::progress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthProgress {
    Pending,
    Ready(TokenPair),
    Failed(String),
}

enum Claim {
    Fresh,
    AlreadyConsumed(Option<TokenPair>),
    Busy,
}

// Rolls the session out of `Exchanging` if the exchange future is dropped
// before the outcome is stored.
struct PendingExchange<'a> {
    sessions: &'a SessionStore,
    session_id: &'a str,
    settled: bool,
}

impl Drop for PendingExchange<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(session = %utils::short_id(self.session_id), "authorization code exchange abandoned");
            self.sessions.abandon_exchange(self.session_id);
        }
    }
}

/// Obtains and keeps current the token pair of each browser session.
///
/// Lifecycle per session:
/// `Unauthenticated → Exchanging → Authenticated → (expiry or rejection) → Unauthenticated`.
/// A code is marked consumed under the store lock before the remote call, so
/// `Exchanging` is entered at most once per code.
#[derive(Debug, Clone)]
pub struct AuthorizationManager {
    credentials: Credentials,
    endpoints: SpotifyEndpoints,
    sessions: SessionStore,
}

impl AuthorizationManager {
    pub fn new(credentials: Credentials, endpoints: SpotifyEndpoints, sessions: SessionStore) -> Self {
        Self {
            credentials,
            endpoints,
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Returns the consent URL for `session_id`.
    ///
    /// The session keeps one `state` value for all links it hands out, so two
    /// open tabs both carry a valid link.
    ///
    /// # Errors
    ///
    /// Configuration errors when the credentials are incomplete; callers must
    /// stop and show them instead of attempting further calls.
    pub async fn build_authorization_url(&self, session_id: &str) -> Result<String, AppError> {
        let state = self
            .sessions
            .update(session_id, |s| {
                s.oauth_state
                    .get_or_insert_with(utils::generate_state)
                    .clone()
            })
            .await
            .unwrap_or_else(utils::generate_state);

        spotify::auth::authorization_url(&self.credentials, &self.endpoints.auth_url, &state)
    }

    /// Resolves which session an incoming redirect belongs to.
    ///
    /// `session_id` is the session of the browser that delivered the
    /// redirect. It must be the one that issued `state`, unless the issuer is
    /// a headless session opened by the terminal flow, whose consent page is
    /// visited from a browser that does not hold its cookie.
    pub async fn resolve_redirect(
        &self,
        state: Option<&str>,
        session_id: &str,
    ) -> Result<String, AppError> {
        let state = state
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::AuthorizationFailed("missing state parameter".to_string()))?;

        let unrecognized = || {
            AppError::AuthorizationFailed(
                "unrecognized authorization request, please start again".to_string(),
            )
        };
        let owner = self
            .sessions
            .find_by_oauth_state(state)
            .await
            .ok_or_else(unrecognized)?;
        if owner == session_id {
            return Ok(owner);
        }

        let headless = self
            .sessions
            .get(&owner)
            .await
            .map(|s| s.headless)
            .unwrap_or(false);
        if headless {
            Ok(owner)
        } else {
            tracing::warn!(
                session = %utils::short_id(session_id),
                "redirect state belongs to another browser session"
            );
            Err(unrecognized())
        }
    }

    /// Whether `session_id` already redeemed `code`, e.g. on a page reload.
    pub async fn has_redeemed(&self, session_id: &str, code: &str) -> bool {
        self.sessions
            .get(session_id)
            .await
            .map(|s| s.has_consumed(code))
            .unwrap_or(false)
    }

    /// Records why the authorization started by `state` failed before any
    /// code arrived (consent denied).
    pub async fn record_failure(&self, state: Option<&str>, session_id: &str, reason: &str) {
        if let Ok(owner) = self.resolve_redirect(state, session_id).await {
            self.sessions
                .update(&owner, |s| s.last_error = Some(reason.to_string()))
                .await;
        }
    }

    /// Redeems `code` for `session_id`.
    ///
    /// Repeating an already redeemed code issues no remote call and returns
    /// the cached pair. On failure, or when the call is abandoned midway, the
    /// previously cached pair, if any, is kept.
    pub async fn exchange_code<S>(
        &self,
        service: &S,
        session_id: &str,
        code: &str,
    ) -> Result<TokenPair, AppError>
    where
        S: MusicService + ?Sized,
    {
        let claim = self
            .sessions
            .update(session_id, |session| {
                if session.has_consumed(code) {
                    return Claim::AlreadyConsumed(session.token().cloned());
                }
                if matches!(session.auth, AuthState::Exchanging { .. }) {
                    return Claim::Busy;
                }
                session.consume(code);
                let previous = session.token().cloned();
                session.auth = AuthState::Exchanging { previous };
                Claim::Fresh
            })
            .await
            .ok_or_else(|| AppError::AuthorizationFailed("unknown session".to_string()))?;

        let short = utils::short_id(session_id);
        match claim {
            Claim::AlreadyConsumed(Some(token)) => {
                tracing::debug!(session = %short, "authorization code already redeemed");
                return Ok(token);
            }
            Claim::AlreadyConsumed(None) => {
                return Err(AppError::AuthorizationFailed(
                    "this authorization code was already used, please authorize again".to_string(),
                ));
            }
            Claim::Busy => {
                return Err(AppError::AuthorizationFailed(
                    "another authorization is in progress".to_string(),
                ));
            }
            Claim::Fresh => {}
        }

        let mut pending = PendingExchange {
            sessions: &self.sessions,
            session_id,
            settled: false,
        };

        tracing::info!(session = %short, "exchanging authorization code");
        let result = match service.exchange_authorization_code(code).await {
            Ok(token) => {
                let stored = token.clone();
                self.sessions
                    .update(session_id, |s| {
                        s.auth = AuthState::Authenticated(stored);
                        s.oauth_state = None;
                        s.last_error = None;
                    })
                    .await;
                tracing::info!(session = %short, expires_at = token.expires_at, "session authenticated");
                Ok(token)
            }
            Err(e) => {
                let err = AppError::AuthorizationFailed(e.to_string());
                let reason = err.to_string();
                self.sessions
                    .update(session_id, |s| {
                        s.abandon_exchange();
                        s.last_error = Some(reason);
                    })
                    .await;
                tracing::warn!(session = %short, error = %e, "authorization code exchange failed");
                Err(err)
            }
        };
        pending.settled = true;
        result
    }

    /// Where the authorization of `session_id` stands, for callers that wait
    /// on a browser they do not control.
    pub async fn progress(&self, session_id: &str) -> AuthProgress {
        if let Some(token) = self.current_token(session_id).await {
            return AuthProgress::Ready(token);
        }
        match self.sessions.get(session_id).await {
            Some(session) => match session.last_error {
                Some(reason) => AuthProgress::Failed(reason),
                None => AuthProgress::Pending,
            },
            None => AuthProgress::Failed("the session expired".to_string()),
        }
    }

    pub fn is_expired(token: &TokenPair) -> bool {
        token.is_expired()
    }

    /// The session's token if present and unexpired. `None` means the user
    /// must (re)authorize.
    pub async fn current_token(&self, session_id: &str) -> Option<TokenPair> {
        self.sessions
            .get(session_id)
            .await
            .and_then(|s| s.token().cloned())
            .filter(|token| !Self::is_expired(token))
    }

    /// Drops the session's token after expiry or an API rejection.
    pub async fn invalidate(&self, session_id: &str) {
        self.sessions
            .update(session_id, |s| s.auth = AuthState::Unauthenticated)
            .await;
        tracing::info!(session = %utils::short_id(session_id), "session token cleared");
    }

    pub async fn auth_state(&self, session_id: &str) -> AuthState {
        self.sessions
            .get(session_id)
            .await
            .map(|s| s.auth)
            .unwrap_or(AuthState::Unauthenticated)
    }
}

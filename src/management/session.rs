use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{types::TokenPair, utils};

pub const SESSION_COOKIE: &str = "genrelist_session";

/// Authorization progress of one browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    /// A code is being redeemed. `previous` is restored if redemption fails.
    Exchanging { previous: Option<TokenPair> },
    Authenticated(TokenPair),
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub auth: AuthState,
    /// `state` value of the most recent consent link handed out. Cleared once
    /// a code has been redeemed for it.
    pub oauth_state: Option<String>,
    /// Opened by the terminal flow. Only such sessions accept a redirect that
    /// arrives without their cookie.
    pub headless: bool,
    /// Why the last authorization attempt failed, if it did.
    pub last_error: Option<String>,
    consumed_codes: HashSet<String>,
    last_seen: DateTime<Utc>,
}

impl Session {
    fn new(id: String) -> Self {
        Self {
            id,
            auth: AuthState::Unauthenticated,
            oauth_state: None,
            headless: false,
            last_error: None,
            consumed_codes: HashSet::new(),
            last_seen: Utc::now(),
        }
    }

    /// The cached token, whether or not it has expired.
    pub fn token(&self) -> Option<&TokenPair> {
        match &self.auth {
            AuthState::Authenticated(token) => Some(token),
            AuthState::Exchanging { previous } => previous.as_ref(),
            AuthState::Unauthenticated => None,
        }
    }

    pub fn has_consumed(&self, code: &str) -> bool {
        self.consumed_codes.contains(code)
    }

    /// Records `code` as redeemed. Returns `false` if it already was.
    pub fn consume(&mut self, code: &str) -> bool {
        self.consumed_codes.insert(code.to_string())
    }

    /// Leaves `Exchanging`, putting back the token held before it.
    pub fn abandon_exchange(&mut self) {
        if let AuthState::Exchanging { previous } = &mut self.auth {
            self.auth = match previous.take() {
                Some(token) => AuthState::Authenticated(token),
                None => AuthState::Unauthenticated,
            };
        }
    }

    fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        (now - self.last_seen)
            .to_std()
            .map(|idle| idle > ttl)
            .unwrap_or(false)
    }
}

/// In-memory, per-browser session state shared by all handlers.
///
/// Sessions idle longer than the configured TTL are evicted whenever a
/// session is opened.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Returns the id of the live session named `id`, creating a new session
    /// when the id is absent, unknown or expired.
    pub async fn open(&self, id: Option<&str>) -> String {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        sessions.retain(|_, s| !s.is_stale(now, self.ttl));

        if let Some(session) = id.and_then(|id| sessions.get_mut(id)) {
            session.last_seen = now;
            return session.id.clone();
        }

        let id = utils::generate_session_id();
        sessions.insert(id.clone(), Session::new(id.clone()));
        tracing::debug!(session = %utils::short_id(&id), "session created");
        id
    }

    /// Creates a session for the terminal flow. See [`Session::headless`].
    pub async fn open_headless(&self) -> String {
        let id = self.open(None).await;
        self.update(&id, |s| s.headless = true).await;
        id
    }

    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.lock().await.get(id).cloned()
    }

    /// Runs `f` on the session while holding the store lock.
    pub async fn update<R>(&self, id: &str, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        self.sessions.lock().await.get_mut(id).map(f)
    }

    /// Finds the session that handed out the consent link carrying `state`.
    pub async fn find_by_oauth_state(&self, state: &str) -> Option<String> {
        self.sessions
            .lock()
            .await
            .values()
            .find(|s| s.oauth_state.as_deref() == Some(state))
            .map(|s| s.id.clone())
    }

    /// Rolls back an exchange that will never complete, without awaiting.
    ///
    /// Used from `Drop`. When the store is locked elsewhere the rollback is
    /// handed to the runtime instead.
    pub fn abandon_exchange(&self, id: &str) {
        match self.sessions.try_lock() {
            Ok(mut sessions) => {
                if let Some(session) = sessions.get_mut(id) {
                    session.abandon_exchange();
                }
            }
            Err(_) => {
                let sessions = Arc::clone(&self.sessions);
                let id = id.to_string();
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    handle.spawn(async move {
                        if let Some(session) = sessions.lock().await.get_mut(&id) {
                            session.abandon_exchange();
                        }
                    });
                }
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

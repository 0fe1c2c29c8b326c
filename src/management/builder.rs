use crate::{
    config::DEFAULT_PLAYLIST_DESCRIPTION,
    error::{AppError, Step},
    query::{ArtistPolicy, SearchQuery},
    spotify::MusicService,
    types::{CreatePlaylistRequest, Playlist, TokenPair, Track},
};

/// Name, visibility and description of the playlist to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSpec {
    pub name: String,
    pub public: bool,
    pub description: String,
}

impl PlaylistSpec {
    /// Public playlist with the default description.
    ///
    /// # Errors
    ///
    /// [`AppError::MissingPlaylistName`] when `name` is blank.
    pub fn new(name: &str) -> Result<Self, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::MissingPlaylistName);
        }
        Ok(Self {
            name: name.to_string(),
            public: true,
            description: DEFAULT_PLAYLIST_DESCRIPTION.to_string(),
        })
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn request(&self) -> CreatePlaylistRequest {
        CreatePlaylistRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            public: self.public,
            collaborative: false,
        }
    }
}

/// Why a created playlist did not receive every track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialReason {
    /// None of the found tracks had a URI.
    NoEligibleUris,
    /// The add-items call failed; the playlist exists but is empty.
    AddFailed(String),
    /// Spotify refused the token while adding items. The session token must
    /// be dropped, the playlist link is still valid.
    TokenRejected,
    /// The token ran out between creating the playlist and adding items.
    TokenExpired,
}

/// Result of one search-and-build run that did not fail outright.
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// The search succeeded with zero results. No playlist was created.
    NoMatches { query: String },
    Created {
        query: String,
        tracks: Vec<Track>,
        playlist: Playlist,
        added: usize,
    },
    /// The playlist exists but the tracks could not (all) be added.
    PartialPlaylistCreated {
        query: String,
        tracks: Vec<Track>,
        playlist: Playlist,
        reason: PartialReason,
    },
}

impl BuildOutcome {
    pub fn query(&self) -> &str {
        match self {
            BuildOutcome::NoMatches { query }
            | BuildOutcome::Created { query, .. }
            | BuildOutcome::PartialPlaylistCreated { query, .. } => query,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        match self {
            BuildOutcome::NoMatches { .. } => &[],
            BuildOutcome::Created { tracks, .. }
            | BuildOutcome::PartialPlaylistCreated { tracks, .. } => tracks,
        }
    }

    pub fn playlist(&self) -> Option<&Playlist> {
        match self {
            BuildOutcome::NoMatches { .. } => None,
            BuildOutcome::Created { playlist, .. }
            | BuildOutcome::PartialPlaylistCreated { playlist, .. } => Some(playlist),
        }
    }

    pub fn playlist_url(&self) -> Option<&str> {
        self.playlist().map(|p| p.url.as_str())
    }

    /// Whether the session token must be dropped after this outcome.
    pub fn clears_token(&self) -> bool {
        matches!(
            self,
            BuildOutcome::PartialPlaylistCreated {
                reason: PartialReason::TokenRejected | PartialReason::TokenExpired,
                ..
            }
        )
    }
}

/// Runs one search and, when it finds anything, one playlist creation.
///
/// All remote calls are issued strictly in sequence: search, user lookup,
/// create, add. Nothing is retried.
pub struct PlaylistBuilder<'a, S: ?Sized> {
    service: &'a S,
    policy: ArtistPolicy,
}

impl<'a, S> PlaylistBuilder<'a, S>
where
    S: MusicService + ?Sized,
{
    pub fn new(service: &'a S, policy: ArtistPolicy) -> Self {
        Self { service, policy }
    }

    /// Builds the query and runs the search only.
    ///
    /// # Errors
    ///
    /// - [`AppError::NoCriteria`] without any network call when both fields are blank
    /// - [`AppError::TokenExpired`] without any network call when the token is stale
    /// - [`AppError::RemoteCallFailed`] / [`AppError::TokenRejected`] for a failed search
    pub async fn search(
        &self,
        token: &TokenPair,
        query: &SearchQuery,
    ) -> Result<(String, Vec<Track>), AppError> {
        let q = query.build(self.policy).ok_or(AppError::NoCriteria)?;
        ensure_fresh(token)?;

        let limit = query.count.get();
        tracing::info!(query = %q, limit, "searching tracks");
        let raw = self
            .service
            .search_tracks(token, &q, limit)
            .await
            .map_err(|e| AppError::from_service(Step::Search, e))?;

        let tracks: Vec<Track> = raw.into_iter().map(Track::from).collect();
        tracing::info!(count = tracks.len(), "search finished");
        Ok((q, tracks))
    }

    /// Searches, then creates and fills a playlist from the results.
    ///
    /// Zero results are reported as [`BuildOutcome::NoMatches`]. A failure
    /// while adding tracks leaves the playlist in place and is reported as
    /// [`BuildOutcome::PartialPlaylistCreated`].
    pub async fn search_and_create(
        &self,
        token: &TokenPair,
        query: &SearchQuery,
        playlist: &PlaylistSpec,
    ) -> Result<BuildOutcome, AppError> {
        let (q, tracks) = self.search(token, query).await?;
        if tracks.is_empty() {
            return Ok(BuildOutcome::NoMatches { query: q });
        }

        ensure_fresh(token)?;
        let user = self
            .service
            .current_user(token)
            .await
            .map_err(|e| AppError::from_service(Step::CurrentUser, e))?;

        let request = playlist.request();
        tracing::info!(owner = %user.id, name = %request.name, "creating playlist");
        let created = self
            .service
            .create_playlist(token, &user.id, &request)
            .await
            .map_err(|e| AppError::from_service(Step::CreatePlaylist, e))?;
        let created = Playlist::from_response(created, &request);

        let uris: Vec<String> = tracks.iter().filter_map(|t| t.uri.clone()).collect();
        if uris.is_empty() {
            tracing::warn!(playlist = %created.id, "no track had a URI, playlist left empty");
            return Ok(BuildOutcome::PartialPlaylistCreated {
                query: q,
                tracks,
                playlist: created,
                reason: PartialReason::NoEligibleUris,
            });
        }

        if ensure_fresh(token).is_err() {
            tracing::warn!(playlist = %created.id, "token expired before adding tracks");
            return Ok(BuildOutcome::PartialPlaylistCreated {
                query: q,
                tracks,
                playlist: created,
                reason: PartialReason::TokenExpired,
            });
        }

        tracing::info!(playlist = %created.id, count = uris.len(), "adding tracks");
        match self.service.add_items(token, &created.id, &uris).await {
            Ok(_) => {
                tracing::info!(playlist = %created.id, url = %created.url, "playlist ready");
                Ok(BuildOutcome::Created {
                    query: q,
                    tracks,
                    playlist: created,
                    added: uris.len(),
                })
            }
            Err(e) => {
                let err = AppError::from_service(Step::AddItems, e);
                tracing::warn!(playlist = %created.id, error = %err, "adding tracks failed");
                let reason = if err.clears_token() {
                    PartialReason::TokenRejected
                } else {
                    PartialReason::AddFailed(err.to_string())
                };
                Ok(BuildOutcome::PartialPlaylistCreated {
                    query: q,
                    tracks,
                    playlist: created,
                    reason,
                })
            }
        }
    }
}

fn ensure_fresh(token: &TokenPair) -> Result<(), AppError> {
    if token.is_expired() {
        Err(AppError::TokenExpired)
    } else {
        Ok(())
    }
}

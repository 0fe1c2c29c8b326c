#![allow(dead_code)]

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use genrelist::{
    config::{Credentials, Settings, SpotifyEndpoints},
    error::ServiceError,
    query::ArtistPolicy,
    spotify::MusicService,
    types::{
        AddTrackToPlaylistResponse, AlbumRef, ArtistRef, CreatePlaylistRequest,
        CreatePlaylistResponse, CurrentUser, ExternalUrls, Image, TokenPair, TrackObject,
    },
};

/// A remote call as seen by the fake, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exchange(String),
    CurrentUser,
    Search { query: String, limit: u32 },
    CreatePlaylist(CreatePlaylistRequest),
    AddItems { playlist_id: String, uris: Vec<String> },
}

/// Failure injected into one operation of the fake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Unauthorized,
    Status(u16),
}

impl Failure {
    fn into_error(self) -> ServiceError {
        match self {
            Failure::Unauthorized => ServiceError::Unauthorized("The access token expired".into()),
            Failure::Status(status) => ServiceError::Status {
                status,
                message: "Something went wrong".into(),
            },
        }
    }
}

/// Recording [`MusicService`] with canned answers.
#[derive(Default)]
pub struct FakeService {
    pub results: Vec<TrackObject>,
    pub fail_exchange: Option<Failure>,
    pub fail_search: Option<Failure>,
    pub fail_user: Option<Failure>,
    pub fail_create: Option<Failure>,
    pub fail_add: Option<Failure>,
    /// Latency of the token endpoint.
    pub exchange_delay: Option<Duration>,
    /// Latency of playlist creation.
    pub create_delay: Option<Duration>,
    pub log: Mutex<Vec<Call>>,
}

impl FakeService {
    pub fn with_results(results: Vec<TrackObject>) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.log.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MusicService for FakeService {
    async fn exchange_authorization_code(&self, code: &str) -> Result<TokenPair, ServiceError> {
        self.record(Call::Exchange(code.to_string()));
        if let Some(delay) = self.exchange_delay {
            tokio::time::sleep(delay).await;
        }
        match self.fail_exchange {
            Some(f) => Err(f.into_error()),
            None => Ok(token_for(code)),
        }
    }

    async fn current_user(&self, _token: &TokenPair) -> Result<CurrentUser, ServiceError> {
        self.record(Call::CurrentUser);
        match self.fail_user {
            Some(f) => Err(f.into_error()),
            None => Ok(CurrentUser {
                id: "user-1".into(),
                display_name: Some("Test User".into()),
            }),
        }
    }

    async fn search_tracks(
        &self,
        _token: &TokenPair,
        query: &str,
        limit: u32,
    ) -> Result<Vec<TrackObject>, ServiceError> {
        self.record(Call::Search {
            query: query.to_string(),
            limit,
        });
        match self.fail_search {
            Some(f) => Err(f.into_error()),
            None => Ok(self.results.iter().take(limit as usize).cloned().collect()),
        }
    }

    async fn create_playlist(
        &self,
        _token: &TokenPair,
        owner_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, ServiceError> {
        assert_eq!(owner_id, "user-1");
        self.record(Call::CreatePlaylist(request.clone()));
        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }
        match self.fail_create {
            Some(f) => Err(f.into_error()),
            None => Ok(CreatePlaylistResponse {
                id: "pl-1".into(),
                name: request.name.clone(),
                description: Some(request.description.clone()),
                public: Some(request.public),
                external_urls: ExternalUrls {
                    spotify: Some("https://open.spotify.com/playlist/pl-1".into()),
                },
            }),
        }
    }

    async fn add_items(
        &self,
        _token: &TokenPair,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<AddTrackToPlaylistResponse, ServiceError> {
        self.record(Call::AddItems {
            playlist_id: playlist_id.to_string(),
            uris: uris.to_vec(),
        });
        match self.fail_add {
            Some(f) => Err(f.into_error()),
            None => Ok(AddTrackToPlaylistResponse {
                snapshot_id: "snap-1".into(),
            }),
        }
    }
}

/// Token the fake hands out for `code`, valid for an hour.
pub fn token_for(code: &str) -> TokenPair {
    TokenPair {
        access_token: format!("access-{}", code),
        refresh_token: format!("refresh-{}", code),
        scope: "playlist-modify-public playlist-modify-private".into(),
        expires_at: Utc::now().timestamp() + 3600,
    }
}

pub fn valid_token() -> TokenPair {
    token_for("test")
}

pub fn expired_token() -> TokenPair {
    TokenPair {
        expires_at: Utc::now().timestamp() - 10,
        ..token_for("old")
    }
}

/// Raw search result with every field present.
pub fn track_object(n: usize) -> TrackObject {
    TrackObject {
        name: Some(format!("Song {}", n)),
        artists: vec![ArtistRef {
            name: Some(format!("Artist {}", n)),
        }],
        album: Some(AlbumRef {
            name: Some(format!("Album {}", n)),
            images: vec![
                Image {
                    url: format!("https://i.scdn.co/image/{}-640", n),
                    height: Some(640),
                    width: Some(640),
                },
                Image {
                    url: format!("https://i.scdn.co/image/{}-300", n),
                    height: Some(300),
                    width: Some(300),
                },
            ],
        }),
        external_urls: ExternalUrls {
            spotify: Some(format!("https://open.spotify.com/track/{}", n)),
        },
        uri: Some(format!("spotify:track:{}", n)),
    }
}

pub fn tracks(n: usize) -> Vec<TrackObject> {
    (1..=n).map(track_object).collect()
}

pub fn credentials() -> Credentials {
    Credentials {
        client_id: "client-id".into(),
        client_secret: "client-secret".into(),
        redirect_uri: "http://127.0.0.1:8501/".into(),
        scope: "playlist-modify-public playlist-modify-private".into(),
    }
}

pub fn settings() -> Settings {
    Settings {
        credentials: credentials(),
        endpoints: SpotifyEndpoints::default(),
        server_addr: "127.0.0.1:0".into(),
        artist_policy: ArtistPolicy::AnyOf,
        playlist_description: "Created with genrelist".into(),
        session_ttl: Duration::from_secs(3600),
    }
}

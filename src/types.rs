use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

pub const UNKNOWN_TRACK: &str = "Unknown Track";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Access/refresh credential pair for one browser session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    /// Unix timestamp (seconds) after which the access token is unusable.
    pub expires_at: i64,
}

impl TokenPair {
    pub fn from_response(response: TokenResponse, obtained_at: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.unwrap_or_default(),
            scope: response.scope.unwrap_or_default(),
            expires_at: obtained_at.timestamp().saturating_add(response.expires_in),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub tracks: Option<TrackPage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackPage {
    // Spotify occasionally returns `null` entries in search pages.
    #[serde(default)]
    pub items: Vec<Option<TrackObject>>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackObject {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

/// One normalized search result, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub artists: Vec<String>,
    pub album: String,
    pub listen_url: Option<String>,
    pub cover_url: Option<String>,
    pub uri: Option<String>,
}

impl Track {
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

impl From<TrackObject> for Track {
    fn from(raw: TrackObject) -> Self {
        let title = non_blank(raw.name).unwrap_or_else(|| UNKNOWN_TRACK.to_string());

        let mut artists: Vec<String> = raw
            .artists
            .into_iter()
            .map(|a| non_blank(a.name).unwrap_or_else(|| UNKNOWN_ARTIST.to_string()))
            .collect();
        if artists.is_empty() {
            artists.push(UNKNOWN_ARTIST.to_string());
        }

        let (album, images) = match raw.album {
            Some(album) => (non_blank(album.name), album.images),
            None => (None, Vec::new()),
        };

        // Spotify orders images largest first; the second one is card sized.
        let cover_url = images
            .get(1)
            .or_else(|| images.first())
            .map(|img| img.url.clone());

        Track {
            title,
            artists,
            album: album.unwrap_or_else(|| UNKNOWN_ALBUM.to_string()),
            listen_url: non_blank(raw.external_urls.spotify),
            cover_url,
            uri: non_blank(raw.uri),
        }
    }
}

/// Remote playlist created on the user's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub url: String,
    pub public: bool,
    pub description: String,
}

impl Playlist {
    pub fn from_response(response: CreatePlaylistResponse, request: &CreatePlaylistRequest) -> Self {
        let url = non_blank(response.external_urls.spotify)
            .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", response.id));
        Self {
            id: response.id,
            name: response.name,
            url,
            public: response.public.unwrap_or(request.public),
            description: response
                .description
                .unwrap_or_else(|| request.description.clone()),
        }
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub title: String,
    pub artists: String,
    pub album: String,
}

impl TrackTableRow {
    pub fn from_track(position: usize, track: &Track) -> Self {
        Self {
            position,
            title: track.title.clone(),
            artists: track.artist_line(),
            album: track.album.clone(),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn image(url: &str) -> Image {
        Image {
            url: url.to_string(),
            height: None,
            width: None,
        }
    }

    #[test]
    fn token_expiry_is_a_timestamp_comparison() {
        let obtained = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let token = TokenPair::from_response(
            TokenResponse {
                access_token: "a".into(),
                token_type: Some("Bearer".into()),
                scope: None,
                expires_in: 3600,
                refresh_token: Some("r".into()),
            },
            obtained,
        );

        assert!(!token.is_expired_at(obtained));
        assert!(!token.is_expired_at(obtained + chrono::Duration::seconds(3599)));
        assert!(token.is_expired_at(obtained + chrono::Duration::seconds(3600)));
    }

    #[test]
    fn huge_lifetime_does_not_overflow() {
        let obtained = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let token = TokenPair::from_response(
            TokenResponse {
                access_token: "a".into(),
                token_type: None,
                scope: None,
                expires_in: i64::MAX,
                refresh_token: None,
            },
            obtained,
        );
        assert_eq!(token.expires_at, i64::MAX);
        assert!(!token.is_expired_at(obtained));
    }

    #[test]
    fn missing_fields_fall_back_to_placeholders() {
        let track = Track::from(TrackObject {
            name: None,
            artists: vec![ArtistRef { name: None }],
            album: None,
            external_urls: ExternalUrls::default(),
            uri: Some(String::new()),
        });

        assert_eq!(track.title, UNKNOWN_TRACK);
        assert_eq!(track.artists, vec![UNKNOWN_ARTIST.to_string()]);
        assert_eq!(track.album, UNKNOWN_ALBUM);
        assert_eq!(track.listen_url, None);
        assert_eq!(track.cover_url, None);
        assert_eq!(track.uri, None);
    }

    #[test]
    fn cover_prefers_the_second_image() {
        let mut raw = TrackObject {
            album: Some(AlbumRef {
                name: Some("Album".into()),
                images: vec![image("large"), image("medium"), image("small")],
            }),
            ..Default::default()
        };
        assert_eq!(Track::from(raw.clone()).cover_url.as_deref(), Some("medium"));

        if let Some(album) = raw.album.as_mut() {
            album.images.truncate(1);
        }
        assert_eq!(Track::from(raw).cover_url.as_deref(), Some("large"));
    }

    #[test]
    fn search_page_tolerates_null_items() {
        let body = r#"{"tracks":{"items":[null,{"name":"Song","uri":"spotify:track:1"}],"total":2}}"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        let items = parsed.tracks.unwrap().items;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_none());
    }
}

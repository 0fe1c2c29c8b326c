//! Search query construction.
//!
//! Turns the free-text genre and artist fields of the form into Spotify's
//! field-filter grammar, e.g. `genre:"rock" (artist:"Queen" OR artist:"Muse")`.

use std::{fmt, str::FromStr};

use crate::{error::AppError, utils};

pub const MIN_RESULTS: u32 = 1;
pub const MAX_RESULTS: u32 = 30;
pub const DEFAULT_RESULTS: u32 = 5;

/// How the artist field is interpreted when it holds several comma-separated names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArtistPolicy {
    /// Every name becomes an `artist:` filter, OR-combined.
    #[default]
    AnyOf,
    /// Only the first non-empty name is used.
    FirstOnly,
}

impl FromStr for ArtistPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "any-of" | "or" => Ok(ArtistPolicy::AnyOf),
            "first" | "first-only" => Ok(ArtistPolicy::FirstOnly),
            other => Err(format!("unknown artist policy '{}'", other)),
        }
    }
}

impl fmt::Display for ArtistPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtistPolicy::AnyOf => f.write_str("any"),
            ArtistPolicy::FirstOnly => f.write_str("first"),
        }
    }
}

/// Number of tracks to search for, always within 1..=30.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultCount(u32);

impl ResultCount {
    pub fn new(n: i64) -> Result<Self, AppError> {
        if (MIN_RESULTS as i64..=MAX_RESULTS as i64).contains(&n) {
            Ok(Self(n as u32))
        } else {
            Err(AppError::InvalidResultCount(n.to_string()))
        }
    }

    /// Parses raw form input. A blank field means the default count.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::default());
        }
        raw.parse::<i64>()
            .map_err(|_| AppError::InvalidResultCount(raw.to_string()))
            .and_then(Self::new)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for ResultCount {
    fn default() -> Self {
        Self(DEFAULT_RESULTS)
    }
}

/// The user's search intent for one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub genre: String,
    pub artist: String,
    pub count: ResultCount,
}

impl SearchQuery {
    pub fn new(genre: impl Into<String>, artist: impl Into<String>, count: ResultCount) -> Self {
        Self {
            genre: genre.into(),
            artist: artist.into(),
            count,
        }
    }

    /// The genre value as it goes into the query, or `None` when blank.
    pub fn genre(&self) -> Option<String> {
        let genre = sanitize(&self.genre);
        (!genre.is_empty()).then_some(genre)
    }

    /// Artist names selected by `policy`, trimmed and without empty entries.
    pub fn artists(&self, policy: ArtistPolicy) -> Vec<String> {
        let names = split_artists(&self.artist);
        match policy {
            ArtistPolicy::AnyOf => names,
            ArtistPolicy::FirstOnly => names.into_iter().take(1).collect(),
        }
    }

    /// Builds the query string, or `None` when there are no criteria at all.
    pub fn build(&self, policy: ArtistPolicy) -> Option<String> {
        let artists = self.artists(policy);
        let artist_clause = (!artists.is_empty()).then(|| {
            artists
                .iter()
                .map(|name| format!("artist:{}", quote(name)))
                .collect::<Vec<_>>()
                .join(" OR ")
        });

        let mut parts: Vec<String> = Vec::new();
        match (self.genre(), artist_clause) {
            (Some(genre), Some(artists)) => {
                parts.push(format!("genre:{}", quote(&genre)));
                parts.push(format!("({})", artists));
            }
            (Some(genre), None) => parts.push(format!("genre:{}", quote(&genre))),
            (None, Some(artists)) => parts.push(artists),
            (None, None) => {}
        }

        (!parts.is_empty()).then(|| parts.join(" "))
    }

    /// Human readable summary shown before the search runs.
    pub fn describe(&self, policy: ArtistPolicy) -> String {
        let mut message = String::from("Searching");
        message.push_str(&format!(" {} tracks", self.count.get()));
        if let Some(genre) = self.genre() {
            message.push_str(&format!(" in genre '{}'", utils::capitalize(&genre)));
        }
        let artists = self.artists(policy);
        if !artists.is_empty() {
            message.push_str(&format!(" by artists: {}", artists.join(", ")));
        }
        message
    }
}

/// Splits comma-separated artist input into trimmed, non-empty names.
pub fn split_artists(text: &str) -> Vec<String> {
    text.split(',')
        .map(sanitize)
        .filter(|name| !name.is_empty())
        .collect()
}

// The search grammar has no escape for a double quote inside a phrase.
fn sanitize(value: &str) -> String {
    value.replace('"', "").trim().to_string()
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value)
}

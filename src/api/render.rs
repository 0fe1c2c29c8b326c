//! HTML generation for the single page.
//!
//! Everything user supplied or returned by Spotify goes through
//! [`utils::escape_html`] before it is written into the document.

use serde::Deserialize;

use crate::{
    error::AppError,
    management::{BuildOutcome, PartialReason},
    query::DEFAULT_RESULTS,
    types::Track,
    utils::{self, escape_html},
};

/// Raw form fields, kept as text so invalid input can be shown back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub count: String,
    #[serde(default)]
    pub playlist_name: String,
}

impl SearchForm {
    /// Values shown on first load.
    pub fn initial() -> Self {
        Self {
            genre: String::new(),
            artist: String::new(),
            count: DEFAULT_RESULTS.to_string(),
            playlist_name: utils::default_playlist_name(""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Success(String),
    Warning(String),
    Error(String),
}

impl Notice {
    fn class(&self) -> &'static str {
        match self {
            Notice::Info(_) => "info",
            Notice::Success(_) => "success",
            Notice::Warning(_) => "warning",
            Notice::Error(_) => "error",
        }
    }

    fn text(&self) -> &str {
        match self {
            Notice::Info(t) | Notice::Success(t) | Notice::Warning(t) | Notice::Error(t) => t,
        }
    }
}

/// Everything the page template needs for one response.
#[derive(Debug, Clone)]
pub struct PageView {
    pub form: SearchForm,
    pub notices: Vec<Notice>,
    pub outcome: Option<BuildOutcome>,
    pub authorized: bool,
    pub auth_url: Option<String>,
}

impl Default for PageView {
    fn default() -> Self {
        Self {
            form: SearchForm::initial(),
            notices: Vec::new(),
            outcome: None,
            authorized: false,
            auth_url: None,
        }
    }
}

impl PageView {
    pub fn with_form(form: SearchForm) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.notices.push(Notice::Info(text.into()));
    }

    pub fn error(&mut self, err: AppError) {
        let notice = match err {
            AppError::NoCriteria | AppError::MissingPlaylistName | AppError::NotAuthorized => {
                Notice::Warning(capitalize_first(&err.to_string()))
            }
            other => Notice::Error(capitalize_first(&other.to_string())),
        };
        self.notices.push(notice);
    }

    /// Records the outcome of a build together with the matching notices.
    pub fn outcome(&mut self, outcome: BuildOutcome) {
        self.info(format!("Query sent: {}", outcome.query()));
        let notice = match &outcome {
            BuildOutcome::NoMatches { .. } => Notice::Warning(
                "No tracks on Spotify match these criteria, so no playlist was created.".into(),
            ),
            BuildOutcome::Created {
                playlist, added, ..
            } => Notice::Success(format!(
                "Playlist '{}' created with {} tracks.",
                playlist.name, added
            )),
            BuildOutcome::PartialPlaylistCreated {
                playlist,
                reason: PartialReason::NoEligibleUris,
                ..
            } => Notice::Warning(format!(
                "Playlist '{}' was created, but none of the tracks could be added.",
                playlist.name
            )),
            BuildOutcome::PartialPlaylistCreated {
                playlist,
                reason: PartialReason::AddFailed(message),
                ..
            } => Notice::Warning(format!(
                "Playlist '{}' was created, but {}",
                playlist.name,
                message
            )),
            BuildOutcome::PartialPlaylistCreated {
                playlist,
                reason: PartialReason::TokenRejected,
                ..
            } => Notice::Warning(format!(
                "Playlist '{}' was created, but Spotify rejected the access token while adding tracks. Please authorize again.",
                playlist.name
            )),
            BuildOutcome::PartialPlaylistCreated {
                playlist,
                reason: PartialReason::TokenExpired,
                ..
            } => Notice::Warning(format!(
                "Playlist '{}' was created, but your Spotify session expired before the tracks were added. Please authorize again.",
                playlist.name
            )),
        };
        self.notices.push(notice);
        self.outcome = Some(outcome);
    }
}

pub fn render_page(view: &PageView) -> String {
    let mut body = String::new();

    body.push_str(&render_account(view));
    for notice in &view.notices {
        body.push_str(&format!(
            "<div class=\"notice {class}\">{text}</div>\n",
            class = notice.class(),
            text = escape_html(notice.text())
        ));
    }
    body.push_str(&render_form(&view.form, view.authorized));

    if let Some(outcome) = &view.outcome {
        body.push_str(&render_outcome(outcome));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Genre Playlist Builder</title>
<style>{style}</style>
</head>
<body>
<main>
<h1>Genre Playlist Builder</h1>
<p>Find tracks by genre or artist and turn them into a Spotify playlist.</p>
{body}
</main>
<aside>
<h2>How to use</h2>
<ol>
<li>Connect your Spotify account.</li>
<li>Fill in a genre, one or more artists (comma separated), or both.</li>
<li>Pick how many tracks to add and name the playlist.</li>
<li>Submit: the playlist is created on your account and linked here.</li>
</ol>
</aside>
<script>{script}</script>
</body>
</html>
"#,
        style = STYLE,
        body = body,
        script = SCRIPT
    )
}

fn render_account(view: &PageView) -> String {
    if view.authorized {
        return "<p class=\"account\">Connected to Spotify. <a href=\"/logout\">Disconnect</a></p>\n"
            .to_string();
    }
    match &view.auth_url {
        Some(url) => format!(
            "<p class=\"account\"><a class=\"button\" href=\"{}\">Connect Spotify account</a></p>\n",
            escape_html(url)
        ),
        None => String::new(),
    }
}

fn render_form(form: &SearchForm, enabled: bool) -> String {
    format!(
        r#"<form method="post" action="/">
<label for="genre">Genre</label>
<input id="genre" name="genre" placeholder="e.g. Pop, Rock, Trap" value="{genre}">
<label for="count">Number of tracks</label>
<input id="count" name="count" type="number" min="1" max="30" value="{count}">
<label for="artist">Artists (optional)</label>
<input id="artist" name="artist" placeholder="e.g. Tarkan, Sezen Aksu" value="{artist}">
<label for="playlist_name">Playlist name</label>
<input id="playlist_name" name="playlist_name" required value="{name}">
<button type="submit"{disabled}>Find tracks and create playlist</button>
</form>
"#,
        genre = escape_html(&form.genre),
        count = escape_html(&form.count),
        artist = escape_html(&form.artist),
        name = escape_html(&form.playlist_name),
        disabled = if enabled { "" } else { " disabled" }
    )
}

fn render_outcome(outcome: &BuildOutcome) -> String {
    let mut html = String::new();

    if let Some(url) = outcome.playlist_url() {
        html.push_str(&format!(
            "<p class=\"playlist\"><a href=\"{}\" target=\"_blank\" rel=\"noopener\">Open the playlist on Spotify</a></p>\n",
            escape_html(url)
        ));
    }

    let tracks = outcome.tracks();
    if !tracks.is_empty() {
        html.push_str("<h2>Tracks found</h2>\n<ol class=\"tracks\">\n");
        for (i, track) in tracks.iter().enumerate() {
            html.push_str(&render_track(i + 1, track));
        }
        html.push_str("</ol>\n");
    }

    html
}

fn render_track(position: usize, track: &Track) -> String {
    let cover = match &track.cover_url {
        Some(url) => format!(
            "<img src=\"{}\" width=\"100\" alt=\"cover\">",
            escape_html(url)
        ),
        None => "<span class=\"no-cover\">(no cover)</span>".to_string(),
    };
    let listen = match &track.listen_url {
        Some(url) => format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">Listen on Spotify</a>",
            escape_html(url)
        ),
        None => String::new(),
    };

    format!(
        "<li class=\"card\"><div class=\"art\">{cover}</div><div class=\"info\"><strong>{position}. {title}</strong><br>Artists: {artists}<br>Album: {album}<br>{listen}</div></li>\n",
        cover = cover,
        position = position,
        title = escape_html(&track.title),
        artists = escape_html(&track.artist_line()),
        album = escape_html(&track.album),
        listen = listen
    )
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

const STYLE: &str = "body{font-family:sans-serif;display:flex;gap:2rem;max-width:60rem;margin:2rem auto}\
main{flex:3}aside{flex:1;font-size:.9rem}\
label{display:block;margin-top:.6rem}input{width:100%;padding:.3rem}\
button{margin-top:1rem;padding:.5rem 1rem}\
.notice{padding:.5rem;margin:.4rem 0;border-radius:4px}\
.info{background:#e8f0fe}.success{background:#e6f4ea}.warning{background:#fef7e0}.error{background:#fce8e6}\
.tracks{list-style:none;padding:0}.card{display:flex;gap:1rem;border-bottom:1px solid #ddd;padding:.6rem 0}\
.art{width:100px}.no-cover{color:#888;font-size:.8rem}";

// Keeps the playlist name in step with the genre until the user edits it.
const SCRIPT: &str = "(function(){var g=document.getElementById('genre'),n=document.getElementById('playlist_name'),t=false;\
n.addEventListener('input',function(){t=true;});\
g.addEventListener('input',function(){if(t)return;var v=g.value.trim();\
n.value=(v?v.charAt(0).toUpperCase()+v.slice(1).toLowerCase():'New')+' Playlist';});})();";

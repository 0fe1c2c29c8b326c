use rand::{Rng, distr::Alphanumeric};

fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Anti-forgery value carried through the OAuth redirect.
pub fn generate_state() -> String {
    random_string(32)
}

/// Opaque identifier stored in the session cookie.
pub fn generate_session_id() -> String {
    random_string(48)
}

/// First eight characters of an identifier, safe to put in log lines.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Upper-cases the first character and lower-cases the rest: `"hIP hop"` -> `"Hip hop"`.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Playlist name suggested for a genre, `"New Playlist"` without one.
pub fn default_playlist_name(genre: &str) -> String {
    let genre = genre.trim();
    if genre.is_empty() {
        "New Playlist".to_string()
    } else {
        format!("{} Playlist", capitalize(genre))
    }
}

/// Escapes text for safe inclusion in HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

//! # CLI Module
//!
//! Command-line entry points of genrelist. Each public function backs one
//! subcommand and reports to the terminal with the crate's colored macros
//! ([`info!`](crate::info), [`success!`](crate::success),
//! [`warning!`](crate::warning), [`error!`](crate::error)).
//!
//! ## Commands
//!
//! - [`serve`] - runs the web page until the process is stopped
//! - [`create`] - authorizes through the browser, then searches and builds a
//!   playlist straight from the terminal
//! - [`auth_url`] - prints the consent link, useful to check the configuration
//!
//! ## Usage
//!
//! ```bash
//! genrelist serve --open
//! genrelist create --genre rock --count 10 --name "Rock Playlist"
//! genrelist create --artist "Tarkan, Sezen Aksu" --name "Turkish Pop" --private
//! genrelist auth-url
//! ```
//!
//! Configuration problems are fatal here: every command loads [`Settings`]
//! first and exits with a message naming the missing variable.
//!
//! [`Settings`]: crate::config::Settings

mod auth;
mod create;
mod serve;

pub use auth::auth_url;
pub use create::CreateOptions;
pub use create::create;
pub use serve::serve;

use crate::{config::Settings, error};

fn load_settings() -> Settings {
    match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!(
                "Cannot start: {}. Set it in the environment or in the genrelist .env file.",
                e
            );
        }
    }
}

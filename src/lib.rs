//! Genre Playlist Builder Library
//!
//! This library powers a small web page (and a companion CLI) that searches the
//! Spotify catalog by genre and/or artist, shows the matching tracks, and turns
//! them into a playlist on the user's account.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the page, the OAuth redirect and health checks
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy shared by every layer
//! - `management` - Session state, authorization lifecycle and the search-and-build flow
//! - `query` - Search query construction from free-text form inputs
//! - `server` - axum router and server bootstrap
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use genrelist::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> genrelist::Res<()> {
//!     config::load_env().await?;
//!     cli::serve(None, false).await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod query;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

use tracing_subscriber::EnvFilter;

/// A convenient Result type alias for startup plumbing that may fail.
///
/// Uses a boxed dynamic error trait object with Send + Sync bounds so it can
/// cross await points. Domain operations use [`error::AppError`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Installs the global `tracing` subscriber.
///
/// The filter is read from `RUST_LOG` and falls back to `genrelist=info` so
/// component boundary events (token exchange, search, playlist calls) are
/// visible by default. Calling it twice is harmless.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("genrelist=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Listening on {}", addr);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for fatal conditions such as missing configuration: the process
/// terminates with exit code 1 right after printing.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

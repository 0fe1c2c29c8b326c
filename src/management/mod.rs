mod auth;
mod builder;
mod session;

pub use auth::AuthProgress;
pub use auth::AuthorizationManager;
pub use builder::BuildOutcome;
pub use builder::PartialReason;
pub use builder::PlaylistBuilder;
pub use builder::PlaylistSpec;
pub use session::AuthState;
pub use session::SESSION_COOKIE;
pub use session::Session;
pub use session::SessionStore;

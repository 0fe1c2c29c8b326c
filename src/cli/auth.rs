use crate::{error, server::AppState, success};

use super::load_settings;

/// Prints a consent URL built from the current configuration.
pub async fn auth_url() {
    let app = AppState::new(load_settings());
    let session = app.auth.sessions().open(None).await;

    match app.auth.build_authorization_url(&session).await {
        Ok(url) => {
            success!("Configuration looks complete. Consent URL:");
            println!("{}", url);
        }
        Err(e) => error!("Cannot build the authorization URL: {}", e),
    }
}

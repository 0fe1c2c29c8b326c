use crate::{error, info, server, warning};

use super::load_settings;

/// Runs the web page.
///
/// `addr` overrides `SERVER_ADDRESS`; with `open` the page is launched in the
/// default browser once the listener is about to start.
pub async fn serve(addr: Option<String>, open: bool) {
    let mut settings = load_settings();
    if let Some(addr) = addr {
        settings.server_addr = addr;
    }

    let url = format!("http://{}/", settings.server_addr);
    info!("Serving genrelist on {}", url);

    if open && webbrowser::open(&url).is_err() {
        warning!("Failed to open browser. Please navigate to {} manually.", url);
    }

    if let Err(e) = server::start_api_server(server::AppState::new(settings)).await {
        error!("Web server stopped: {}", e);
    }
}

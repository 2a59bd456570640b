//! Command handlers.

pub mod auth;
pub mod config;
pub mod links;
pub mod tui;

use anyhow::{Result, anyhow};
use scorelinks_core::auth::ends_session;
use scorelinks_core::{ApiClient, ApiError, AuthService, LinkDirectory, SessionStore};

/// Shown when a request is rejected with HTTP 401 and the session was cleared.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Run `scorelinks login` again.";

/// Services shared by the networked commands.
pub struct ApiContext {
    client: ApiClient,
    logout_on_unauthorized: bool,
}

impl ApiContext {
    pub fn new(base_url: &str, logout_on_unauthorized: bool) -> Self {
        Self {
            client: ApiClient::new(base_url, SessionStore::file()),
            logout_on_unauthorized,
        }
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.client.clone())
    }

    pub fn links(&self) -> LinkDirectory {
        LinkDirectory::new(self.client.clone())
    }

    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    /// Fails early when no session is stored.
    pub fn require_login(&self) -> Result<()> {
        if self.session().is_authenticated() {
            Ok(())
        } else {
            Err(anyhow!("Not logged in. Run `scorelinks login` first."))
        }
    }

    /// Converts an API error, ending the session on HTTP 401 when configured.
    pub fn api_error(&self, err: ApiError) -> anyhow::Error {
        if ends_session(&err, self.logout_on_unauthorized) {
            self.auth().logout();
            return anyhow!(SESSION_EXPIRED_MESSAGE);
        }
        anyhow::Error::new(err)
    }
}

//! Full-screen TUI for the 16Score vMix API-link service.
//!
//! Elm-style: [`update::update`] folds a [`events::UiEvent`] into
//! [`state::AppState`] and returns [`effects::UiEffect`]s, which the
//! [`TuiRuntime`] executes.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};
use std::sync::Arc;

use anyhow::{Context, Result};
pub use runtime::{Services, TuiRuntime};
use scorelinks_core::clipboard::SystemClipboard;
use scorelinks_core::config::{Config, paths};
use scorelinks_core::{ApiClient, AuthService, LinkDirectory, SessionStore, logging};

use crate::state::AppState;

/// Runs the TUI against `base_url` until the user quits.
///
/// Must be called from within a multi-threaded tokio runtime; the event
/// loop blocks the calling thread while requests run on the workers.
///
/// # Errors
/// Returns an error if stderr is not a terminal, logging cannot be set up,
/// or the terminal fails.
pub fn run(config: &Config, base_url: &str) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The interactive UI requires a terminal.\n\
             Use `scorelinks links list` and friends for non-interactive use."
        );
    }

    let _log_guard = logging::init_file(&paths::logs_dir(), &config.log.level)
        .context("Failed to initialize logging")?;
    tracing::info!(base_url, "starting tui");

    let client = ApiClient::new(base_url, SessionStore::file());
    let services = Services {
        auth: AuthService::new(client.clone()),
        links: LinkDirectory::new(client),
        clipboard: Arc::new(SystemClipboard),
    };
    let state = AppState::new(base_url, config.api.logout_on_unauthorized);

    let mut runtime = TuiRuntime::new(state, services)?;
    let result = runtime.run();
    drop(runtime);

    writeln!(stderr(), "Goodbye!")?;
    result
}

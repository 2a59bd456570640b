//! Application state composition.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── auth: AuthFlow          (phase, loading, current user)
//! │   ├── login: LoginFormState   (email/password fields, inline error)
//! │   ├── tab: Tab                (dashboard or manage links)
//! │   ├── links: LinksState       (snapshot, selection, copy flag)
//! │   ├── task_seq: TaskSeq       (async task id generator)
//! │   └── tasks: Tasks            (task lifecycle state)
//! └── overlay: Option<Overlay>    (link form, link details)
//! ```
//!
//! Overlay handlers get `&mut Overlay` and `&TuiState` at the same time,
//! which is why the overlay lives outside `TuiState`.

use scorelinks_core::auth::AuthFlow;
use scorelinks_core::{AuthPhase, User};

use crate::common::{TaskSeq, Tasks};
use crate::events::FormId;
use crate::features::links::LinksState;
use crate::features::login::LoginFormState;
use crate::overlays::Overlay;

/// Shown on the login screen after a 401 ends the session.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired";

pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(api_url: impl Into<String>, logout_on_unauthorized: bool) -> Self {
        Self {
            tui: TuiState::new(api_url.into(), logout_on_unauthorized),
            overlay: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    ManageLinks,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::ManageLinks => "Manage API Links",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Dashboard => Tab::ManageLinks,
            Tab::ManageLinks => Tab::Dashboard,
        }
    }
}

/// What the main area shows. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Login,
    Dashboard,
    ManageLinks,
}

pub struct TuiState {
    pub should_quit: bool,
    /// Base URL the client talks to, shown on the dashboard.
    pub api_url: String,
    pub logout_on_unauthorized: bool,
    pub auth: AuthFlow,
    pub login: LoginFormState,
    pub tab: Tab,
    pub links: LinksState,
    /// One-line status for the footer (refresh failures and the like).
    pub notice: Option<String>,
    pub task_seq: TaskSeq,
    pub tasks: Tasks,
    pub spinner_frame: usize,
    form_seq: u64,
}

impl TuiState {
    pub fn new(api_url: String, logout_on_unauthorized: bool) -> Self {
        Self {
            should_quit: false,
            api_url,
            logout_on_unauthorized,
            auth: AuthFlow::new(),
            login: LoginFormState::default(),
            tab: Tab::default(),
            links: LinksState::default(),
            notice: None,
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            spinner_frame: 0,
            form_seq: 0,
        }
    }

    pub fn next_form_id(&mut self) -> FormId {
        self.form_seq += 1;
        FormId(self.form_seq)
    }

    pub fn screen(&self) -> Screen {
        if !self.auth.is_initialized() {
            return Screen::Loading;
        }
        match (self.auth.phase(), self.tab) {
            (AuthPhase::Anonymous, _) => Screen::Login,
            (AuthPhase::Authenticated, Tab::Dashboard) => Screen::Dashboard,
            (AuthPhase::Authenticated, Tab::ManageLinks) => Screen::ManageLinks,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.auth.user()
    }

    /// Drops everything tied to the signed-in user.
    ///
    /// In-flight tasks are forgotten, so their results are ignored when
    /// they arrive.
    pub fn reset_session_view(&mut self) {
        self.auth.signed_out();
        self.tasks.clear_all(self.task_seq.peek());
        self.tab = Tab::Dashboard;
        self.links = LinksState::default();
        self.login = LoginFormState::default();
        self.notice = None;
    }
}

#[cfg(test)]
mod tests {
    use scorelinks_core::AuthState;

    use super::*;

    #[test]
    fn test_screen_is_loading_until_session_restored() {
        let mut tui = TuiState::new("http://localhost".into(), true);
        assert_eq!(tui.screen(), Screen::Loading);

        tui.auth.adopt(&AuthState::default());
        assert_eq!(tui.screen(), Screen::Login);
    }

    #[test]
    fn test_tab_ignored_while_anonymous() {
        let mut tui = TuiState::new("http://localhost".into(), true);
        tui.auth.adopt(&AuthState::default());
        tui.tab = Tab::ManageLinks;
        assert_eq!(tui.screen(), Screen::Login);
    }
}

//! Login screen: email and password form.

mod render;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
pub use render::render_login;
use scorelinks_core::auth::AuthFlow;
use scorelinks_core::{ApiResult, Credentials, LoginData};

use crate::effects::UiEffect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

impl LoginField {
    fn toggle(self) -> Self {
        match self {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginFormState {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
}

impl LoginFormState {
    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }
}

/// Inserts pasted text into the focused field, dropping line breaks.
pub fn handle_paste(form: &mut LoginFormState, busy: bool, text: &str) {
    if busy {
        return;
    }
    form.focused_mut()
        .extend(text.chars().filter(|c| !matches!(c, '\n' | '\r')));
}

/// Handles a key on the login screen. `busy` is true while a login is in flight.
pub fn handle_key(
    form: &mut LoginFormState,
    auth: &mut AuthFlow,
    busy: bool,
    key: KeyEvent,
) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Esc => vec![UiEffect::Quit],
        KeyCode::Char('c') if ctrl => vec![UiEffect::Quit],
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            form.focus = form.focus.toggle();
            vec![]
        }
        KeyCode::Enter => submit(form, auth, busy),
        _ if busy => vec![],
        KeyCode::Backspace => {
            form.focused_mut().pop();
            vec![]
        }
        KeyCode::Char('u') if ctrl => {
            form.focused_mut().clear();
            vec![]
        }
        KeyCode::Char(c) if !ctrl => {
            form.focused_mut().push(c);
            vec![]
        }
        _ => vec![],
    }
}

fn submit(form: &mut LoginFormState, auth: &mut AuthFlow, busy: bool) -> Vec<UiEffect> {
    if busy {
        return vec![];
    }
    form.error = None;

    let credentials = Credentials::new(form.email.trim(), form.password.clone());
    if let Err(err) = credentials.validate() {
        form.error = Some(err.message);
        return vec![];
    }

    auth.begin_login();
    vec![UiEffect::Login {
        task: None,
        credentials,
    }]
}

/// Applies a finished login. The form is cleared on success.
pub fn handle_login_finished(
    form: &mut LoginFormState,
    auth: &mut AuthFlow,
    result: ApiResult<LoginData>,
) {
    match auth.finish_login(result) {
        Ok(()) => *form = LoginFormState::default(),
        Err(err) => {
            tracing::warn!(kind = %err.kind, "login failed: {}", err.message);
            form.error = Some(err.message);
        }
    }
}

use scorelinks_core::{AuthService, AuthState, Credentials};

use crate::events::{AuthUiEvent, UiEvent};

pub async fn restore_session(service: AuthService) -> UiEvent {
    // The session file read is blocking I/O.
    let state = tokio::task::spawn_blocking(move || service.auth_state())
        .await
        .unwrap_or_else(|err| {
            tracing::error!("session restore task failed: {err}");
            AuthState::default()
        });
    tracing::debug!(authenticated = state.is_authenticated, "session restored");
    UiEvent::Auth(AuthUiEvent::SessionRestored(state))
}

pub async fn login(service: AuthService, credentials: Credentials) -> UiEvent {
    UiEvent::Auth(AuthUiEvent::LoginFinished(service.login(&credentials).await))
}

pub async fn refresh_user(service: AuthService) -> UiEvent {
    UiEvent::Auth(AuthUiEvent::UserRefreshed(service.refresh_user().await))
}

pub fn logout(service: &AuthService) {
    service.logout();
}

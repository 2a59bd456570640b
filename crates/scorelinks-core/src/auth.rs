//! Login, logout, and the authentication state machine.
//!
//! [`AuthService`] does the network and storage work. [`AuthFlow`] is the
//! pure state the view layer renders from; it never performs I/O itself,
//! except through the `login`/`logout` conveniences that pair it with a
//! service.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::http::ApiClient;
use crate::session::{AuthState, SessionStore};
use crate::user::User;

/// Shown whenever a required form field is blank.
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";

const LOGIN_FORMAT_MESSAGE: &str = "Login failed - invalid response format";

/// Login input. Serializes as the `/auth/login` request body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Both fields must be non-empty.
    ///
    /// # Errors
    /// Returns a `Validation` error naming the missing input.
    pub fn validate(&self) -> ApiResult<()> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ApiError::validation(MISSING_FIELDS_MESSAGE));
        }
        Ok(())
    }
}

/// Successful `/auth/login` payload.
#[derive(Clone, Deserialize)]
pub struct LoginData {
    pub token: String,
    pub user: User,
}

impl fmt::Debug for LoginData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginData")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// Network-facing authentication operations.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    pub fn auth_state(&self) -> AuthState {
        self.session().auth_state()
    }

    /// Exchanges credentials for a session and persists it.
    ///
    /// Storage is only written after a well-formed success response.
    ///
    /// # Errors
    /// - `Validation` for blank fields (no request is made)
    /// - `HttpStatus`/`Network` from the request
    /// - `InvalidResponseFormat` when the envelope lacks `success`, `token`, or `user`
    /// - `Storage` when the session cannot be persisted
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<LoginData> {
        credentials.validate()?;

        let body = serde_json::to_value(credentials)
            .map_err(|e| ApiError::validation(format!("Failed to encode credentials: {e}")))?;
        let response = self.client.post::<Value>("/auth/login", Some(body)).await?;

        let format_error = |message: Option<String>| {
            ApiError::invalid_response(
                message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| LOGIN_FORMAT_MESSAGE.to_string()),
            )
        };

        if !response.success {
            return Err(format_error(response.message));
        }
        let Some(data) = response.data else {
            return Err(format_error(response.message));
        };
        let data: LoginData = serde_json::from_value(data).map_err(|e| {
            tracing::warn!("login payload missing token or user: {e}");
            format_error(response.message.clone())
        })?;

        self.session()
            .set_session(&data.token, &data.user)
            .map_err(|e| ApiError::storage(&e))?;

        tracing::info!(user_id = %data.user.id, "logged in");
        Ok(data)
    }

    /// Clears the persisted session. Never fails; storage problems are logged.
    pub fn logout(&self) {
        match self.session().clear_session() {
            Ok(()) => tracing::info!("logged out"),
            Err(err) => tracing::error!("failed to clear session: {err:#}"),
        }
    }

    /// Fetches `/auth/me` and replaces the stored user on success.
    ///
    /// Returns `Ok(None)` when the server answers without a user.
    ///
    /// # Errors
    /// Returns request errors so callers can react to HTTP 401.
    pub async fn refresh_user(&self) -> ApiResult<Option<User>> {
        let response = self.client.get::<User>("/auth/me").await?;

        match response.data {
            Some(user) if response.success => {
                self.session()
                    .set_user(&user)
                    .map_err(|e| ApiError::storage(&e))?;
                Ok(Some(user))
            }
            _ => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Anonymous,
    Authenticated,
}

/// Authentication state as the view layer sees it.
#[derive(Debug, Clone)]
pub struct AuthFlow {
    phase: AuthPhase,
    loading: bool,
    initialized: bool,
    user: Option<User>,
}

impl Default for AuthFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthFlow {
    /// Anonymous and loading until [`AuthFlow::initialize`] runs.
    pub fn new() -> Self {
        Self {
            phase: AuthPhase::Anonymous,
            loading: true,
            initialized: false,
            user: None,
        }
    }

    /// Reads the store once and adopts it. The token is not checked with the server.
    pub fn initialize(&mut self, store: &SessionStore) {
        self.adopt(&store.auth_state());
    }

    /// Adopts an already-read session snapshot.
    pub fn adopt(&mut self, state: &AuthState) {
        self.phase = if state.is_authenticated {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Anonymous
        };
        self.user = state.user.clone();
        self.loading = false;
        self.initialized = true;
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == AuthPhase::Authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn begin_login(&mut self) {
        self.loading = true;
    }

    /// Applies a login result. On failure the phase is unchanged.
    ///
    /// # Errors
    /// Returns the login error for display.
    pub fn finish_login(&mut self, result: ApiResult<LoginData>) -> ApiResult<()> {
        self.loading = false;
        let data = result?;
        self.phase = AuthPhase::Authenticated;
        self.user = Some(data.user);
        Ok(())
    }

    /// Replaces the displayed user after a refresh.
    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Drops to anonymous. Storage must be cleared separately.
    pub fn signed_out(&mut self) {
        self.phase = AuthPhase::Anonymous;
        self.user = None;
        self.loading = false;
    }

    /// Runs a full login against `service`.
    ///
    /// # Errors
    /// Returns the login error; the flow stays in its previous phase.
    pub async fn login(&mut self, service: &AuthService, credentials: &Credentials) -> ApiResult<()> {
        self.begin_login();
        let result = service.login(credentials).await;
        self.finish_login(result)
    }

    /// Clears storage and drops to anonymous, whatever the prior state.
    pub fn logout(&mut self, service: &AuthService) {
        service.logout();
        self.signed_out();
    }

    /// Logs out when `err` is an HTTP 401 from a call made with a session.
    ///
    /// Returns `true` if the session was ended.
    pub fn handle_api_error(&mut self, service: &AuthService, err: &ApiError) -> bool {
        if !self.is_authenticated() || !err.is_unauthorized() {
            return false;
        }
        tracing::info!("server rejected the session, logging out");
        self.logout(service);
        true
    }
}

/// True when `err` should end the session.
pub fn ends_session(err: &ApiError, logout_on_unauthorized: bool) -> bool {
    logout_on_unauthorized && err.is_unauthorized()
}

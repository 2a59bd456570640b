//! Client library for the 16Score vMix API-link service.
//!
//! - [`http`]: JSON client that attaches the session's bearer token
//! - [`session`]: durable token + user storage
//! - [`auth`]: login/logout and the auth state machine
//! - [`links`]: API-link directory (list, create, update, toggle)

pub mod auth;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod http;
pub mod interrupt;
pub mod links;
pub mod logging;
pub mod session;
pub mod user;

pub use auth::{AuthFlow, AuthPhase, AuthService, Credentials, LoginData};
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use http::{ApiClient, ApiResponse, RequestOptions};
pub use links::{ApiLink, LinkDirectory, LinkDraft, LinkMutation, LinkType};
pub use session::{AuthState, SessionStore};
pub use user::User;

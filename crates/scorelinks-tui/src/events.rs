//! UI events fed to the reducer.
//!
//! Terminal input and ticks come from the runtime loop. Everything else is
//! the result of a spawned task, delivered through the inbox.

use crossterm::event::Event;
use scorelinks_core::links::ListSnapshot;
use scorelinks_core::{ApiError, ApiResult, AuthState, LoginData, User};

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

#[derive(Debug)]
pub enum UiEvent {
    Tick,
    Terminal(Event),
    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },
    Auth(AuthUiEvent),
    Links(LinksUiEvent),
    Copied {
        link_id: String,
        result: Result<(), String>,
    },
}

#[derive(Debug)]
pub enum AuthUiEvent {
    /// Persisted session read at startup.
    SessionRestored(AuthState),
    LoginFinished(ApiResult<LoginData>),
    UserRefreshed(ApiResult<Option<User>>),
}

/// Identifies one opened link form; reopening the form gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormId(pub u64);

/// Where a mutation was started, so its result lands in the right place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOrigin {
    /// The create/edit form overlay that submitted it.
    Form { form: FormId },
    /// A row action on the links table (toggle).
    Row { link_id: String },
}

#[derive(Debug)]
pub enum LinksUiEvent {
    Loaded(ApiResult<ListSnapshot>),
    /// The mutation itself failed; no refetch was issued.
    MutationFailed {
        origin: MutationOrigin,
        error: ApiError,
    },
    /// The mutation succeeded and the list was re-fetched.
    Mutated {
        origin: MutationOrigin,
        refetch: ApiResult<ListSnapshot>,
    },
}

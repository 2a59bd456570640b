//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only; the reducer itself never
//! touches the network, the session file or the clipboard.
//!
//! Effects that spawn a task carry `task: Option<TaskId>`. Key handlers that
//! cannot reach the id sequence leave it `None` and the reducer fills it in
//! before the effects leave [`crate::update::update`].

use scorelinks_core::{ApiLink, Credentials, LinkMutation};

use crate::common::{TaskId, TaskSeq};
use crate::events::MutationOrigin;

#[derive(Debug)]
pub enum UiEffect {
    Quit,

    /// Read the persisted session.
    RestoreSession,

    Login {
        task: Option<TaskId>,
        credentials: Credentials,
    },

    /// Clear persisted session data.
    Logout,

    /// `GET /auth/me`.
    RefreshUser { task: Option<TaskId> },

    FetchLinks { task: Option<TaskId> },

    /// Run one mutation, then re-fetch the list.
    ApplyLinkMutation {
        task: Option<TaskId>,
        mutation: LinkMutation,
        origin: MutationOrigin,
    },

    CopyToClipboard { link: ApiLink },

    OpenBrowser { url: String },
}

impl UiEffect {
    fn task_slot(&mut self) -> Option<&mut Option<TaskId>> {
        match self {
            UiEffect::Login { task, .. }
            | UiEffect::RefreshUser { task }
            | UiEffect::FetchLinks { task }
            | UiEffect::ApplyLinkMutation { task, .. } => Some(task),
            UiEffect::Quit
            | UiEffect::RestoreSession
            | UiEffect::Logout
            | UiEffect::CopyToClipboard { .. }
            | UiEffect::OpenBrowser { .. } => None,
        }
    }
}

/// Gives every task-spawning effect without an id a fresh one.
pub fn assign_task_ids(seq: &mut TaskSeq, mut effects: Vec<UiEffect>) -> Vec<UiEffect> {
    for effect in &mut effects {
        if let Some(slot) = effect.task_slot()
            && slot.is_none()
        {
            *slot = Some(seq.next_id());
        }
    }
    effects
}

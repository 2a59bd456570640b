//! Async task bookkeeping.
//!
//! The reducer allocates a [`TaskId`] for every spawned request. The runtime
//! reports `TaskStarted`/`TaskCompleted` for that id, and a completion is
//! only applied while its id is still active. [`Tasks::clear_all`] (logout)
//! makes every in-flight result a no-op, including tasks whose start
//! notification is still queued.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    /// The id the next call to [`TaskSeq::next_id`] will return.
    pub fn peek(&self) -> TaskId {
        TaskId(self.next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Login,
    RefreshUser,
    LinksFetch,
    LinkMutation,
}

impl TaskKind {
    pub const ALL: [TaskKind; 4] = [
        TaskKind::Login,
        TaskKind::RefreshUser,
        TaskKind::LinksFetch,
        TaskKind::LinkMutation,
    ];
}

#[derive(Debug, Clone, Copy)]
pub struct TaskStarted {
    pub id: TaskId,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Ids of in-flight tasks of one kind.
///
/// Several tasks of a kind may run at once (two toggles on different rows),
/// so this keeps a set rather than a single slot.
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    active: Vec<TaskId>,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        !self.active.is_empty()
    }

    pub fn running_count(&self) -> usize {
        self.active.len()
    }

    pub fn on_started(&mut self, started: &TaskStarted) {
        if !self.active.contains(&started.id) {
            self.active.push(started.id);
        }
    }

    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let before = self.active.len();
        self.active.retain(|active| *active != id);
        self.active.len() != before
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub login: TaskState,
    pub refresh_user: TaskState,
    pub links_fetch: TaskState,
    pub link_mutation: TaskState,
    /// Ids below this were issued before the last `clear_all`.
    floor: u64,
}

impl Tasks {
    pub fn state(&self, kind: TaskKind) -> &TaskState {
        match kind {
            TaskKind::Login => &self.login,
            TaskKind::RefreshUser => &self.refresh_user,
            TaskKind::LinksFetch => &self.links_fetch,
            TaskKind::LinkMutation => &self.link_mutation,
        }
    }

    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::Login => &mut self.login,
            TaskKind::RefreshUser => &mut self.refresh_user,
            TaskKind::LinksFetch => &mut self.links_fetch,
            TaskKind::LinkMutation => &mut self.link_mutation,
        }
    }

    /// Records a started task unless it predates the last `clear_all`.
    pub fn on_started(&mut self, kind: TaskKind, started: &TaskStarted) {
        if started.id.0 < self.floor {
            tracing::debug!(?kind, id = started.id.0, "ignoring task started before reset");
            return;
        }
        self.state_mut(kind).on_started(started);
    }

    pub fn is_any_running(&self) -> bool {
        TaskKind::ALL
            .iter()
            .any(|kind| self.state(*kind).is_running())
    }

    /// Forgets every task. `next` is the first id still to be issued.
    pub fn clear_all(&mut self, next: TaskId) {
        for kind in TaskKind::ALL {
            self.state_mut(kind).clear();
        }
        self.floor = next.0;
    }
}

//! Helpers shared across features.

pub mod task;
pub mod text;

pub use task::{TaskCompleted, TaskId, TaskKind, TaskSeq, TaskStarted, TaskState, Tasks};
pub use text::{mask, truncate_start_with_ellipsis, truncate_with_ellipsis};

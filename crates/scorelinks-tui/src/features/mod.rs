//! Feature slices for the TUI (state/update/render per slice).

pub mod dashboard;
pub mod links;
pub mod login;

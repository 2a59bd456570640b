//! Effect handlers: async functions that perform I/O and return the event
//! carrying the result. The runtime decides how they are spawned.

mod auth;
mod links;

pub use auth::{login, logout, refresh_user, restore_session};
pub use links::{apply_mutation, copy_link, fetch_links};

//! Ctrl+C handling for full-screen mode.
//!
//! The signal handler only sets a flag that the event loop polls. A second
//! signal before the flag is reset restores the terminal and exits.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static RESTORE_HOOK: OnceLock<Box<dyn Fn() + Send + Sync>> = OnceLock::new();

/// Installs the Ctrl+C handler.
///
/// # Errors
/// Returns an error if a handler is already registered.
pub fn init() -> Result<()> {
    ctrlc::set_handler(trigger_ctrl_c).context("Error setting Ctrl+C handler")
}

/// Records an interrupt, force-exiting on the second one.
pub fn trigger_ctrl_c() {
    if INTERRUPTED.swap(true, Ordering::SeqCst) {
        // process::exit() bypasses Drop, so restore the terminal first.
        if let Some(hook) = RESTORE_HOOK.get() {
            hook();
        }
        std::process::exit(130);
    }
}

pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

pub fn reset() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

/// Registers the terminal restore callback used before a forced exit.
/// Only the first registration wins.
pub fn set_restore_hook(hook: impl Fn() + Send + Sync + 'static) {
    let _ = RESTORE_HOOK.set(Box::new(hook));
}

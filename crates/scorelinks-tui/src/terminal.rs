//! Terminal lifecycle management.
//!
//! The terminal is restored on normal exit (runtime `Drop`), on a forced
//! exit after a second Ctrl+C, and on panic.

use std::io::{self, Stdout};
use std::panic;

use anyhow::{Context, Result};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Enables raw mode, enters the alternate screen and turns on bracketed
/// paste. Call [`install_panic_hook`] first.
///
/// # Errors
/// Returns an error if the terminal rejects any of the steps.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Idempotent; safe to call from the panic hook and from `Drop`.
///
/// # Errors
/// Returns an error if leaving the alternate screen or raw mode fails.
pub fn restore_terminal() -> Result<()> {
    // Must happen before leaving raw mode.
    let _ = execute!(io::stdout(), DisableBracketedPaste);

    execute!(io::stdout(), LeaveAlternateScreen).context("Failed to leave alternate screen")?;
    disable_raw_mode().context("Failed to disable raw mode")?;
    Ok(())
}

/// Restores the terminal before the previous panic hook prints.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}

//! Clipboard access.
//!
//! [`SystemClipboard`] tries, in order:
//! 1. OSC 52 - terminal clipboard escape sequence (works over SSH), only when
//!    stdout is a terminal
//! 2. System clipboard via the `arboard` crate

use std::io::{self, IsTerminal, Write};

/// Destination for copied text.
pub trait ClipboardSink: Send + Sync {
    /// # Errors
    /// Returns an error if no transport accepted the text.
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        if io::stdout().is_terminal() && Self::copy_osc52(text).is_ok() {
            return Ok(());
        }

        Self::copy_system(text)
    }
}

impl SystemClipboard {
    /// Writes the OSC 52 sequence to stdout; the terminal does the copy.
    fn copy_osc52(text: &str) -> Result<(), ClipboardError> {
        use base64::Engine;

        let encoded = base64::engine::general_purpose::STANDARD.encode(text);

        // ESC ] 52 ; c ; <base64> ESC \   ('c' = system clipboard)
        let mut stdout = io::stdout();
        write!(stdout, "\x1b]52;c;{encoded}\x1b\\")
            .map_err(|e| ClipboardError::Osc52(e.to_string()))?;
        stdout
            .flush()
            .map_err(|e| ClipboardError::Osc52(e.to_string()))?;

        Ok(())
    }

    fn copy_system(text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::System(e.to_string()))?;

        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::System(e.to_string()))?;

        Ok(())
    }
}

/// Clipboard operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    /// OSC 52 write failed.
    Osc52(String),
    /// System clipboard operation failed.
    System(String),
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipboardError::Osc52(msg) => write!(f, "OSC 52 clipboard failed: {msg}"),
            ClipboardError::System(msg) => write!(f, "System clipboard failed: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

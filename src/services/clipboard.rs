use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Clipboard failures. Logged for diagnostics only, never shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("System clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard write failed: {0}")]
    Write(String),

    #[error("Clipboard task failed: {0}")]
    Task(String),
}

/// Write-only text clipboard
pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard via `arboard`
///
/// The handle is opened on first use and kept for the life of the process; on
/// X11 the copied text is only served while the owning handle is alive.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        if inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            *inner = Some(clipboard);
        }

        match inner.as_mut() {
            Some(clipboard) => clipboard
                .set_text(text.to_string())
                .map_err(|e| ClipboardError::Write(e.to_string())),
            None => Err(ClipboardError::Unavailable("clipboard not initialised".to_string())),
        }
    }
}

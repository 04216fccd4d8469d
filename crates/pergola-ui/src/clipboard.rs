//! Clipboard access behind a trait so text widgets stay testable.

use parking_lot::Mutex;

/// Plain-text clipboard operations.
pub trait Clipboard: Send + Sync {
    /// Current clipboard text, `None` when empty or unavailable.
    fn get_text(&self) -> Option<String>;

    /// Replaces the clipboard contents.
    fn set_text(&self, text: &str);
}

/// System clipboard backed by `arboard`.
///
/// Platform failures are logged and reported as an empty clipboard.
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, arboard::Error> {
        Ok(Self {
            inner: Mutex::new(arboard::Clipboard::new()?),
        })
    }
}

impl Clipboard for SystemClipboard {
    fn get_text(&self) -> Option<String> {
        match self.inner.lock().get_text() {
            Ok(text) => Some(text),
            Err(arboard::Error::ContentNotAvailable) => None,
            Err(err) => {
                log::warn!("clipboard read failed: {err}");
                None
            }
        }
    }

    fn set_text(&self, text: &str) {
        if let Err(err) = self.inner.lock().set_text(text) {
            log::warn!("clipboard write failed: {err}");
        }
    }
}

//! Where `y` sends the selected formula.
//!
//! The viewer only ever writes to the clipboard, so the trait has a single
//! operation and tests plug in an in-memory implementation.

pub trait ClipboardProvider {
    /// Replace the clipboard contents. The error is shown in the status bar.
    fn copy_text(&mut self, text: &str) -> Result<(), String>;
}

/// The desktop clipboard, opened on first copy and kept for the session.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ClipboardProvider for SystemClipboard {
    fn copy_text(&mut self, text: &str) -> Result<(), String> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new().map_err(|e| {
                tracing::warn!(error = %e, "clipboard unavailable");
                e.to_string()
            })?;
            self.inner = Some(clipboard);
        }
        let Some(clipboard) = self.inner.as_mut() else {
            return Err("clipboard unavailable".to_string());
        };
        clipboard.set_text(text).map_err(|e| {
            tracing::warn!(error = %e, "clipboard write failed");
            e.to_string()
        })
    }
}

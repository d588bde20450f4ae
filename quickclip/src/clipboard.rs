//! System clipboard sink (arboard)

use crate::interface::{ClipboardSink, QuickClipError};
use crate::models::Item;

/// Writes plain text to the OS clipboard. The handle is opened on first use.
///
/// On Linux the writing process owns the selection, so a short-lived process
/// must use [`SystemClipboard::holding`] or the text disappears when it exits.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
    hold_until_taken: bool,
}

impl SystemClipboard {
    /// Sink for a long-running process that keeps the clipboard alive itself
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose writes block until another application takes over the
    /// clipboard (a paste target or a clipboard manager). Only Linux blocks.
    pub fn holding() -> Self {
        Self {
            inner: None,
            hold_until_taken: true,
        }
    }

    pub fn holds_until_taken(&self) -> bool {
        self.hold_until_taken
    }

    fn handle(&mut self) -> Result<&mut arboard::Clipboard, QuickClipError> {
        if self.inner.is_none() {
            let clipboard =
                arboard::Clipboard::new().map_err(|e| QuickClipError::Clipboard(e.to_string()))?;
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| QuickClipError::Clipboard("clipboard unavailable".into()))
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), QuickClipError> {
        let hold = self.hold_until_taken;
        let clipboard = self.handle()?;
        let result = if hold {
            set_and_hold(clipboard, text)
        } else {
            clipboard.set_text(text.to_string())
        };
        result.map_err(|e| QuickClipError::Clipboard(e.to_string()))
    }
}

#[cfg(target_os = "linux")]
fn set_and_hold(clipboard: &mut arboard::Clipboard, text: &str) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;
    log::debug!("Holding clipboard ownership until another client takes it");
    clipboard.set().wait().text(text.to_string())
}

#[cfg(not(target_os = "linux"))]
fn set_and_hold(clipboard: &mut arboard::Clipboard, text: &str) -> Result<(), arboard::Error> {
    clipboard.set_text(text.to_string())
}

/// Clipboard payload: values joined with newlines, in the given order
pub fn join_values<'a, I>(items: I) -> String
where
    I: IntoIterator<Item = &'a Item>,
{
    items
        .into_iter()
        .map(|item| item.value.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

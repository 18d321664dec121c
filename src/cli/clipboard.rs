//! Clipboard copy with auto-clear.
//!
//! A copied secret stays on the clipboard only for a fixed number of
//! seconds; the clipboard is then overwritten with an empty string,
//! but only if it still holds the secret we placed there.

use std::thread;
use std::time::Duration;

use arboard::Clipboard;

use crate::errors::{KeySealError, Result};

/// Put `secret` on the clipboard, block for `clear_after_secs`, then
/// clear it again.
pub fn copy_with_clear(secret: &str, clear_after_secs: u64) -> Result<()> {
    let mut clipboard =
        Clipboard::new().map_err(|e| KeySealError::ClipboardError(e.to_string()))?;
    clipboard
        .set_text(secret.to_string())
        .map_err(|e| KeySealError::ClipboardError(e.to_string()))?;

    thread::sleep(Duration::from_secs(clear_after_secs));

    // Only clear if nothing else replaced our text in the meantime.
    match clipboard.get_text() {
        Ok(current) if current == secret => {
            clipboard
                .clear()
                .map_err(|e| KeySealError::ClipboardError(e.to_string()))?;
        }
        _ => {}
    }
    Ok(())
}

//! Clipboard share target using arboard
//!
//! Desktops have no system share sheet, so sharing a take places its
//! location on the clipboard for pasting into another application.

use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::{ShareError, ShareTarget};
use crate::domain::recording::FileUri;

/// Share target that copies the take location to the clipboard
pub struct ClipboardShare;

impl ClipboardShare {
    /// Create a new clipboard share target
    pub fn new() -> Self {
        Self
    }

    /// Text placed on the clipboard for a take
    pub fn shared_text(uri: &FileUri) -> String {
        match uri.to_path() {
            Some(path) => path.display().to_string(),
            None => uri.as_str().to_string(),
        }
    }
}

impl Default for ClipboardShare {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShareTarget for ClipboardShare {
    async fn share(&self, uri: &FileUri) -> Result<(), ShareError> {
        let text = Self::shared_text(uri);
        debug!(text = %text, "Sharing take via clipboard");

        // arboard operations are blocking, so run in spawn_blocking
        tokio::task::spawn_blocking(move || {
            let mut clipboard = arboard::Clipboard::new()
                .map_err(|e| ShareError::Unavailable(e.to_string()))?;

            clipboard
                .set_text(text)
                .map_err(|e| ShareError::ShareFailed(e.to_string()))
        })
        .await
        .map_err(|e| ShareError::ShareFailed(format!("Task join error: {}", e)))?
    }
}

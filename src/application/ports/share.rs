//! Share port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::FileUri;

/// Share errors
#[derive(Debug, Clone, Error)]
pub enum ShareError {
    #[error("Share target unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to share recording: {0}")]
    ShareFailed(String),
}

/// Port for handing a recording to the user's share target
#[async_trait]
pub trait ShareTarget: Send + Sync {
    /// Share a recording file.
    ///
    /// Errors are non-fatal and meant to be shown to the user.
    async fn share(&self, uri: &FileUri) -> Result<(), ShareError>;
}

/// Blanket implementation for boxed share types
#[async_trait]
impl ShareTarget for Box<dyn ShareTarget> {
    async fn share(&self, uri: &FileUri) -> Result<(), ShareError> {
        self.as_ref().share(uri).await
    }
}

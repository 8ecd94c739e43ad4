//! Microphone permission port interface

use async_trait::async_trait;

/// Outcome of a microphone access request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

impl Permission {
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Port for obtaining microphone authorization
#[async_trait]
pub trait MicrophonePermission: Send + Sync {
    /// Ask the platform for microphone access.
    ///
    /// Denial is an ordinary outcome, not an error.
    async fn request_microphone_access(&self) -> Permission;
}

/// Blanket implementation for boxed permission types
#[async_trait]
impl MicrophonePermission for Box<dyn MicrophonePermission> {
    async fn request_microphone_access(&self) -> Permission {
        self.as_ref().request_microphone_access().await
    }
}

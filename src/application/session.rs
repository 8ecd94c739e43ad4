//! Recording session use case
//!
//! Drives one recording from the permission request to a finalized
//! [`RecordingEntry`], over the permission, recorder and player ports.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::recording::{FileUri, PlayableHandle, RecordingEntry};
use crate::domain::session::{
    InvalidStateTransition, SessionFailure, SessionLifecycle, SessionPhase, SessionState,
};

use super::ports::{AudioPlayer, AudioRecorder, CaptureConfig, MicrophonePermission};

/// Errors returned by [`RecordingSession::stop`]
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Recording device error: {message}")]
    Device {
        message: String,
        /// Captured file left behind, if the recorder produced one
        partial_file: Option<FileUri>,
    },
}

/// Result of a successful finalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalized {
    pub entry: RecordingEntry,
    /// The take, loaded and ready to replay
    pub playable: PlayableHandle,
}

/// A single recording, from request to durable file and metadata.
///
/// One instance records once. After it reaches Finalized or Failed a new
/// session has to be constructed for the next take.
pub struct RecordingSession<P, R, L>
where
    P: MicrophonePermission,
    R: AudioRecorder,
    L: AudioPlayer,
{
    permission: Arc<P>,
    recorder: Arc<R>,
    player: Arc<L>,
    config: CaptureConfig,
    lifecycle: SessionLifecycle,
}

impl<P, R, L> RecordingSession<P, R, L>
where
    P: MicrophonePermission,
    R: AudioRecorder,
    L: AudioPlayer,
{
    /// Create an idle session
    pub fn new(permission: Arc<P>, recorder: Arc<R>, player: Arc<L>, config: CaptureConfig) -> Self {
        Self {
            permission,
            recorder,
            player,
            config,
            lifecycle: SessionLifecycle::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        self.lifecycle.state()
    }

    pub fn phase(&self) -> SessionPhase {
        self.lifecycle.phase()
    }

    pub fn is_active(&self) -> bool {
        self.phase() == SessionPhase::Active
    }

    /// The finalized entry, once the session has one
    pub fn entry(&self) -> Option<&RecordingEntry> {
        match self.state() {
            SessionState::Finalized(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&SessionFailure> {
        match self.state() {
            SessionState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// User-facing message for a failed session
    pub fn message(&self) -> Option<String> {
        self.failure().map(ToString::to_string)
    }

    /// Request microphone access and begin capturing.
    ///
    /// Permission denial and device failures are reported through the
    /// session state, not as errors. Only calling `start` outside of Idle
    /// is an error.
    ///
    /// # Returns
    /// The phase the session landed in: Active or Failed
    pub async fn start(&mut self) -> Result<SessionPhase, InvalidStateTransition> {
        if self.phase() != SessionPhase::Idle {
            return Err(InvalidStateTransition {
                current_state: self.phase(),
                action: "start recording".to_string(),
            });
        }

        let permission = self.permission.request_microphone_access().await;
        if !permission.is_granted() {
            warn!("Microphone access denied");
            self.lifecycle.fail(SessionFailure::PermissionDenied)?;
            return Ok(self.phase());
        }

        debug!(quality = %self.config.quality, "Beginning capture");
        match self.recorder.begin_capture(&self.config).await {
            Ok(handle) => {
                self.lifecycle.activate(handle)?;
                info!(capture = handle.id(), "Recording started");
            }
            Err(err) => {
                warn!(error = %err, "Failed to begin capture");
                self.lifecycle.fail(SessionFailure::Device {
                    message: err.to_string(),
                    partial_file: None,
                })?;
            }
        }

        Ok(self.phase())
    }

    /// Stop capturing, load the take and produce its entry.
    ///
    /// Steps run in order: release the capture, load the file for
    /// playback, read its duration. A failure in either of the first two
    /// moves the session to Failed and is returned, carrying the partial
    /// file when one exists.
    pub async fn stop(&mut self) -> Result<Finalized, SessionError> {
        let handle = self.lifecycle.begin_finalizing()?;

        let uri = match self.recorder.end_capture(handle).await {
            Ok(uri) => uri,
            Err(err) => return Err(self.fail_device(err.to_string(), None)),
        };
        debug!(uri = %uri, "Capture released");

        let loaded = match self.player.load_for_playback(&uri).await {
            Ok(loaded) => loaded,
            Err(err) => return Err(self.fail_device(err.to_string(), Some(uri))),
        };

        let entry = RecordingEntry::new(uri, loaded.duration_millis);
        self.lifecycle.finalize(entry.clone())?;
        info!(
            uri = %entry.file_uri(),
            duration = %entry.display_duration(),
            "Recording finalized"
        );

        Ok(Finalized {
            entry,
            playable: loaded.handle,
        })
    }

    fn fail_device(&mut self, message: String, partial_file: Option<FileUri>) -> SessionError {
        warn!(error = %message, partial_file = ?partial_file, "Finalization failed");

        let failure = SessionFailure::Device {
            message: message.clone(),
            partial_file: partial_file.clone(),
        };
        if let Err(err) = self.lifecycle.fail(failure) {
            warn!(error = %err, "Session already terminal");
        }

        SessionError::Device {
            message,
            partial_file,
        }
    }
}

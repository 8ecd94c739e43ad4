//! Recording session state machine

use std::fmt;
use thiserror::Error;

use crate::domain::recording::{CaptureHandle, FileUri, RecordingEntry};

/// Message shown when microphone access is refused
pub const PERMISSION_DENIED_MESSAGE: &str = "Please grant permission to app to access microphone";

/// Session phases, without their payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Active,
    Finalizing,
    Finalized,
    Failed,
}

impl SessionPhase {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Finalizing => "finalizing",
            Self::Finalized => "finalized",
            Self::Failed => "failed",
        }
    }

    /// Finalized and Failed sessions accept no further transitions
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized | Self::Failed)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: SessionPhase,
    pub action: String,
}

/// Why a session ended in the Failed state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionFailure {
    #[error("{}", PERMISSION_DENIED_MESSAGE)]
    PermissionDenied,

    #[error("Recording device error: {message}")]
    Device {
        message: String,
        /// Captured file left behind by a failed finalization, if known
        partial_file: Option<FileUri>,
    },
}

/// Session state with payloads
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Active(CaptureHandle),
    Finalizing,
    Finalized(RecordingEntry),
    Failed(SessionFailure),
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            Self::Idle => SessionPhase::Idle,
            Self::Active(_) => SessionPhase::Active,
            Self::Finalizing => SessionPhase::Finalizing,
            Self::Finalized(_) => SessionPhase::Finalized,
            Self::Failed(_) => SessionPhase::Failed,
        }
    }
}

/// Lifecycle of a single recording.
///
/// State machine:
///   IDLE -> ACTIVE (activate)
///   ACTIVE -> FINALIZING (begin_finalizing)
///   FINALIZING -> FINALIZED (finalize)
///   IDLE | ACTIVE | FINALIZING -> FAILED (fail)
///
/// FINALIZED and FAILED are terminal; the next recording needs a new lifecycle.
#[derive(Debug, Default)]
pub struct SessionLifecycle {
    state: SessionState,
}

impl SessionLifecycle {
    /// Create a new lifecycle in idle state
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    fn reject(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.phase(),
            action: action.to_string(),
        }
    }

    /// Transition from IDLE to ACTIVE
    pub fn activate(&mut self, handle: CaptureHandle) -> Result<(), InvalidStateTransition> {
        if self.phase() != SessionPhase::Idle {
            return Err(self.reject("start recording"));
        }
        self.state = SessionState::Active(handle);
        Ok(())
    }

    /// Transition from ACTIVE to FINALIZING, handing back the capture handle
    pub fn begin_finalizing(&mut self) -> Result<CaptureHandle, InvalidStateTransition> {
        match self.state {
            SessionState::Active(handle) => {
                self.state = SessionState::Finalizing;
                Ok(handle)
            }
            _ => Err(self.reject("stop recording")),
        }
    }

    /// Transition from FINALIZING to FINALIZED
    pub fn finalize(&mut self, entry: RecordingEntry) -> Result<(), InvalidStateTransition> {
        if self.phase() != SessionPhase::Finalizing {
            return Err(self.reject("finalize recording"));
        }
        self.state = SessionState::Finalized(entry);
        Ok(())
    }

    /// Transition any non-terminal state to FAILED
    pub fn fail(&mut self, failure: SessionFailure) -> Result<(), InvalidStateTransition> {
        if self.phase().is_terminal() {
            return Err(self.reject("fail recording"));
        }
        self.state = SessionState::Failed(failure);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> RecordingEntry {
        RecordingEntry::new(FileUri::new("file:///take.wav"), 1_000)
    }

    #[test]
    fn new_lifecycle_is_idle() {
        let lifecycle = SessionLifecycle::new();
        assert_eq!(lifecycle.phase(), SessionPhase::Idle);
        assert_eq!(lifecycle.state(), &SessionState::Idle);
    }

    #[test]
    fn full_cycle() {
        let mut lifecycle = SessionLifecycle::new();
        lifecycle.activate(CaptureHandle::new(7)).unwrap();
        assert_eq!(lifecycle.phase(), SessionPhase::Active);

        let handle = lifecycle.begin_finalizing().unwrap();
        assert_eq!(handle.id(), 7);
        assert_eq!(lifecycle.phase(), SessionPhase::Finalizing);

        lifecycle.finalize(entry()).unwrap();
        assert_eq!(lifecycle.state(), &SessionState::Finalized(entry()));
    }

    #[test]
    fn activate_twice_fails() {
        let mut lifecycle = SessionLifecycle::new();
        lifecycle.activate(CaptureHandle::new(1)).unwrap();

        let err = lifecycle.activate(CaptureHandle::new(2)).unwrap_err();
        assert_eq!(err.current_state, SessionPhase::Active);
        assert!(err.action.contains("start recording"));
    }

    #[test]
    fn begin_finalizing_from_idle_fails() {
        let mut lifecycle = SessionLifecycle::new();

        let err = lifecycle.begin_finalizing().unwrap_err();
        assert_eq!(err.current_state, SessionPhase::Idle);
        assert_eq!(lifecycle.phase(), SessionPhase::Idle);
    }

    #[test]
    fn finalize_requires_finalizing() {
        let mut lifecycle = SessionLifecycle::new();
        lifecycle.activate(CaptureHandle::new(1)).unwrap();

        let err = lifecycle.finalize(entry()).unwrap_err();
        assert_eq!(err.current_state, SessionPhase::Active);
    }

    #[test]
    fn fail_from_idle_during_start() {
        let mut lifecycle = SessionLifecycle::new();
        lifecycle.fail(SessionFailure::PermissionDenied).unwrap();
        assert_eq!(
            lifecycle.state(),
            &SessionState::Failed(SessionFailure::PermissionDenied)
        );
    }

    #[test]
    fn terminal_states_reject_everything() {
        let mut lifecycle = SessionLifecycle::new();
        lifecycle.fail(SessionFailure::PermissionDenied).unwrap();

        assert!(lifecycle.activate(CaptureHandle::new(1)).is_err());
        assert!(lifecycle.begin_finalizing().is_err());
        assert!(lifecycle.fail(SessionFailure::PermissionDenied).is_err());

        let mut finalized = SessionLifecycle::new();
        finalized.activate(CaptureHandle::new(1)).unwrap();
        finalized.begin_finalizing().unwrap();
        finalized.finalize(entry()).unwrap();
        assert!(finalized.activate(CaptureHandle::new(2)).is_err());
        assert!(finalized.begin_finalizing().is_err());
    }

    #[test]
    fn phase_display() {
        assert_eq!(SessionPhase::Idle.to_string(), "idle");
        assert_eq!(SessionPhase::Finalizing.to_string(), "finalizing");
        assert!(SessionPhase::Failed.is_terminal());
        assert!(!SessionPhase::Active.is_terminal());
    }

    #[test]
    fn failure_messages() {
        assert_eq!(
            SessionFailure::PermissionDenied.to_string(),
            PERMISSION_DENIED_MESSAGE
        );
        let device = SessionFailure::Device {
            message: "no input".to_string(),
            partial_file: None,
        };
        assert!(device.to_string().contains("no input"));
    }
}

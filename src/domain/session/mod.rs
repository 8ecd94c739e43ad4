pub mod state;

pub use state::{
    InvalidStateTransition, SessionFailure, SessionLifecycle, SessionPhase, SessionState,
    PERMISSION_DENIED_MESSAGE,
};

//! Application layer - Use cases and port interfaces
//!
//! Contains the recording session, the persisted recording index, the
//! controller tying them together, and trait definitions for external
//! system interactions.

pub mod index;
pub mod memos;
pub mod ports;
pub mod session;

// Re-export use cases
pub use index::{IndexError, RecordingIndex, INDEX_KEY};
pub use memos::{EntrySelector, ErrorKind, MemoController, MemoError, Take};
pub use session::{Finalized, RecordingSession, SessionError};

//! Voice Memos - record, list, play, share and delete audio takes
//!
//! This crate provides a recording session state machine, a persisted index
//! of recorded takes, and desktop adapters for capture and playback.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects, the session state machine, and errors
//! - **Application**: Recording session, recording index, memo controller, and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, rodio, clipboard, JSON storage, etc.)
//! - **CLI**: Command-line interface, argument parsing, and logging setup

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

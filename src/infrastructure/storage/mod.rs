//! Durable storage adapters
//!
//! Key-value stores for the recording index and the local file store used
//! to delete takes.

mod json_file;
mod local_files;
mod memory;

pub use json_file::JsonFileStore;
pub use local_files::LocalFileStore;
pub use memory::MemoryStore;

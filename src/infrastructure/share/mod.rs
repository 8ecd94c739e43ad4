//! Share target adapters

mod clipboard;

pub use clipboard::ClipboardShare;

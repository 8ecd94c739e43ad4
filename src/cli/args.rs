//! CLI argument definitions using Clap

use clap::{Parser, Subcommand, ValueEnum};

use crate::application::EntrySelector;
use crate::domain::recording::QualityPreset;

/// Voice Memos - record, list, play, share and delete audio takes
#[derive(Parser, Debug)]
#[command(name = "voice-memos")]
#[command(version)]
#[command(about = "Record voice memos and manage your takes")]
#[command(long_about = None)]
pub struct Cli {
    /// Show debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a new take (stop with Enter or Ctrl-C)
    Record {
        /// Stop automatically after this long (e.g., 30s, 1m, 2m30s)
        #[arg(short = 'd', long, value_name = "TIME")]
        duration: Option<String>,

        /// Recording quality preset
        #[arg(short = 'q', long, value_name = "QUALITY")]
        quality: Option<QualityArg>,
    },
    /// List recorded takes
    List,
    /// Play a take
    Play {
        /// Take number (from `list`) or recording uri
        #[arg(value_name = "TAKE|URI")]
        target: EntrySelector,
    },
    /// Share a take
    Share {
        /// Take number (from `list`) or recording uri
        #[arg(value_name = "TAKE|URI")]
        target: EntrySelector,
    },
    /// Delete a take and its file
    Delete {
        /// Take number (from `list`) or recording uri
        #[arg(value_name = "TAKE|URI")]
        target: EntrySelector,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Quality argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum QualityArg {
    High,
    Low,
}

impl From<QualityArg> for QualityPreset {
    fn from(arg: QualityArg) -> Self {
        match arg {
            QualityArg::High => QualityPreset::High,
            QualityArg::Low => QualityPreset::Low,
        }
    }
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "recordings_dir",
    "storage_file",
    "quality",
    "silent_mode_playback",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

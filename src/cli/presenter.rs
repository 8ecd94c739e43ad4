//! CLI presenter for output formatting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::application::{ErrorKind, MemoError, Take};
use crate::domain::recording::format_duration;

/// Width of the time-limit progress bar in cells
const BAR_WIDTH: usize = 20;

/// Presenter for CLI output formatting
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Report a failed command.
    ///
    /// Permission, device and storage failures are warnings with a retry
    /// hint. Usage mistakes and a corrupt index are errors.
    pub fn failure(&self, err: &MemoError) {
        match retry_hint(err) {
            Some(hint) => self.warn(&format!("{} ({})", err, hint)),
            None => self.error(&err.to_string()),
        }
    }

    /// Output text to stdout (listings and values meant for piping)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Format recording progress against a time limit
    pub fn format_progress(&self, elapsed_ms: u64, total_ms: u64) -> String {
        let elapsed_ms = elapsed_ms.min(total_ms);
        let filled = if total_ms > 0 {
            (elapsed_ms as f64 / total_ms as f64 * BAR_WIDTH as f64) as usize
        } else {
            0
        };

        format!(
            "[{}{}] {} / {}",
            "█".repeat(filled).cyan(),
            "░".repeat(BAR_WIDTH - filled),
            format_duration(elapsed_ms),
            format_duration(total_ms)
        )
    }

    /// Update recording progress against a time limit
    pub fn update_recording_progress(&self, elapsed_ms: u64, total_ms: u64) {
        let progress = self.format_progress(elapsed_ms, total_ms);
        self.update_spinner(&format!("Recording... {}", progress));
    }

    /// Update recording progress with no time limit
    pub fn update_recording_elapsed(&self, elapsed_ms: u64) {
        self.update_spinner(&format!(
            "Recording... {} (press Enter to stop)",
            format_duration(elapsed_ms).cyan()
        ));
    }

    /// Print one listed take: label, then its location dimmed
    pub fn take(&self, take: &Take<'_>) {
        println!(
            "{}  {}",
            take.to_string().bold(),
            take.entry.file_uri().as_str().dimmed()
        );
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

fn retry_hint(err: &MemoError) -> Option<&'static str> {
    match err.kind() {
        ErrorKind::PermissionDenied => Some("grant microphone access and try again"),
        ErrorKind::DeviceError | ErrorKind::StorageError => Some("try again"),
        ErrorKind::Usage | ErrorKind::CorruptIndex => None,
    }
}

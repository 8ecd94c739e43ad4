//! Command runners

use std::process::ExitCode;
use std::time::{Duration as StdDuration, Instant};

use tracing::{debug, info};

use crate::application::ports::{CaptureConfig, ConfigStore};
use crate::application::{EntrySelector, ErrorKind, MemoController, MemoError, RecordingIndex};
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::recording::{Duration, QualityPreset};
use crate::infrastructure::{
    ClipboardShare, CpalRecorder, InputDevicePermission, JsonFileStore, LocalFileStore,
    RodioPlayer, XdgConfigStore,
};

use super::args::Commands;
use super::config_cmd::handle_config_command;
use super::presenter::Presenter;
use super::signals::StopSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// How often the recording spinner refreshes its elapsed time
const PROGRESS_INTERVAL: StdDuration = StdDuration::from_millis(200);

/// Controller wired to the desktop adapters
pub type DesktopController = MemoController<
    InputDevicePermission,
    CpalRecorder,
    RodioPlayer,
    JsonFileStore,
    LocalFileStore,
    ClipboardShare,
>;

/// Exit code for a controller error
pub fn exit_code_for(err: &MemoError) -> u8 {
    match err.kind() {
        ErrorKind::Usage => EXIT_USAGE_ERROR,
        _ => EXIT_ERROR,
    }
}

/// Load and merge configuration from defaults, file, and CLI
pub async fn load_merged_config<S: ConfigStore>(
    store: &S,
    cli_config: AppConfig,
) -> Result<AppConfig, ConfigError> {
    let file_config = store.load().await?;

    // Merge: defaults < file < cli
    Ok(AppConfig::defaults().merge(file_config).merge(cli_config))
}

/// Capture settings for a merged config
pub fn capture_config(config: &AppConfig) -> CaptureConfig {
    CaptureConfig {
        allows_recording: true,
        plays_in_silent_mode: config.silent_mode_playback_or_default(),
        quality: config.quality_or_default(),
    }
}

/// Build the controller and load the persisted index
pub async fn build_controller(config: &AppConfig) -> Result<DesktopController, MemoError> {
    let storage_file = config.storage_file_or_default();
    let recordings_dir = config.recordings_dir_or_default();
    debug!(
        storage = %storage_file.display(),
        recordings = %recordings_dir.display(),
        "Opening recording index"
    );

    let index = RecordingIndex::open(JsonFileStore::new(storage_file), LocalFileStore::new()).await?;

    Ok(MemoController::new(
        InputDevicePermission::new(),
        CpalRecorder::new(recordings_dir),
        RodioPlayer::new(),
        ClipboardShare::new(),
        index,
        capture_config(config),
    ))
}

/// Run one command and map the outcome to an exit code
pub async fn run_command(command: Commands) -> ExitCode {
    let mut presenter = Presenter::new();
    let store = XdgConfigStore::new();

    if let Commands::Config { action } = command {
        return match handle_config_command(action, &store, &presenter).await {
            Ok(()) => ExitCode::from(EXIT_SUCCESS),
            Err(e) => {
                presenter.error(&e.to_string());
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    let cli_config = match &command {
        Commands::Record {
            quality: Some(quality),
            ..
        } => AppConfig {
            quality: Some(QualityPreset::from(*quality).to_string()),
            ..AppConfig::empty()
        },
        _ => AppConfig::empty(),
    };

    let config = match load_merged_config(&store, cli_config).await {
        Ok(config) => config,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let limit = match &command {
        Commands::Record {
            duration: Some(text),
            ..
        } => match text.parse::<Duration>() {
            Ok(d) => Some(d),
            Err(e) => {
                presenter.error(&format!("Invalid duration: {}", e));
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
        },
        _ => None,
    };

    let mut controller = match build_controller(&config).await {
        Ok(controller) => controller,
        Err(e) => {
            presenter.failure(&e);
            return ExitCode::from(exit_code_for(&e));
        }
    };

    let result = match command {
        Commands::Record { .. } => record(&mut controller, &mut presenter, limit).await,
        Commands::List => {
            list(&controller, &presenter);
            Ok(())
        }
        Commands::Play { target } => play(&mut controller, &mut presenter, &target).await,
        Commands::Share { target } => share(&mut controller, &presenter, &target).await,
        Commands::Delete { target } => delete(&mut controller, &presenter, &target).await,
        Commands::Config { .. } => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.failure(&e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Record a take until Enter, Ctrl-C, or the time limit
async fn record(
    controller: &mut DesktopController,
    presenter: &mut Presenter,
    limit: Option<Duration>,
) -> Result<(), MemoError> {
    controller.begin_recording().await?;

    let started = Instant::now();
    let (mut stop, _stop_tx) = StopSignal::listen(limit.map(|d| d.as_std()));
    let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);

    presenter.start_spinner("Recording... (press Enter to stop)");
    let reason = loop {
        tokio::select! {
            reason = stop.recv() => break reason,
            _ = ticker.tick() => {
                let elapsed = started.elapsed().as_millis() as u64;
                match limit {
                    Some(limit) => presenter.update_recording_progress(elapsed, limit.as_millis()),
                    None => presenter.update_recording_elapsed(elapsed),
                }
            }
        }
    };
    info!(reason = reason.map(|r| r.as_str()).unwrap_or("closed"), "Stopping recording");

    presenter.update_spinner("Saving take...");
    match controller.finish_recording().await {
        Ok(entry) => {
            let number = controller.index().len();
            presenter.spinner_success(&format!(
                "Take {} - {}",
                number,
                entry.display_duration()
            ));
            presenter.output(entry.file_uri().as_str());
            Ok(())
        }
        Err(e) => {
            presenter.spinner_fail("Recording failed");
            Err(e)
        }
    }
}

/// Print every take in order
fn list(controller: &DesktopController, presenter: &Presenter) {
    if controller.index().is_empty() {
        presenter.info("No recordings yet");
        return;
    }

    for take in controller.takes() {
        presenter.take(&take);
    }
}

async fn play(
    controller: &mut DesktopController,
    presenter: &mut Presenter,
    target: &EntrySelector,
) -> Result<(), MemoError> {
    let entry = controller.resolve(target)?;
    presenter.start_spinner(&format!("Playing {} ({})", target, entry.display_duration()));

    match controller.play(target).await {
        Ok(_) => {
            presenter.spinner_success("Playback finished");
            Ok(())
        }
        Err(e) => {
            presenter.spinner_fail("Playback failed");
            Err(e)
        }
    }
}

async fn share(
    controller: &mut DesktopController,
    presenter: &Presenter,
    target: &EntrySelector,
) -> Result<(), MemoError> {
    let entry = controller.share(target).await?;
    presenter.success(&format!(
        "Copied location of {} to clipboard: {}",
        target,
        entry.file_uri()
    ));
    Ok(())
}

async fn delete(
    controller: &mut DesktopController,
    presenter: &Presenter,
    target: &EntrySelector,
) -> Result<(), MemoError> {
    let entry = controller.delete(target).await?;
    presenter.success(&format!("Deleted {}", entry.file_uri()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::IndexError;
    use crate::domain::recording::FileUri;

    #[test]
    fn usage_errors_map_to_usage_exit_code() {
        let err = MemoError::UnknownRecording("take 9".to_string());
        assert_eq!(exit_code_for(&err), EXIT_USAGE_ERROR);

        let err = MemoError::Index(IndexError::NotFound(FileUri::new("file:///a.wav")));
        assert_eq!(exit_code_for(&err), EXIT_USAGE_ERROR);
    }

    #[test]
    fn other_errors_map_to_error_exit_code() {
        let err = MemoError::Index(IndexError::Corrupt("bad json".to_string()));
        assert_eq!(exit_code_for(&err), EXIT_ERROR);
    }

    #[test]
    fn capture_config_follows_merged_config() {
        let config = AppConfig {
            quality: Some("low".to_string()),
            silent_mode_playback: Some(false),
            ..AppConfig::empty()
        };
        let capture = capture_config(&config);
        assert!(capture.allows_recording);
        assert!(!capture.plays_in_silent_mode);
        assert_eq!(capture.quality, QualityPreset::Low);
    }

    #[tokio::test]
    async fn cli_flags_override_file_config() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        store
            .save(&AppConfig {
                quality: Some("low".to_string()),
                recordings_dir: Some("/srv/takes".to_string()),
                ..AppConfig::empty()
            })
            .await
            .unwrap();

        let cli = AppConfig {
            quality: Some("high".to_string()),
            ..AppConfig::empty()
        };
        let merged = load_merged_config(&store, cli).await.unwrap();

        assert_eq!(merged.quality, Some("high".to_string()));
        assert_eq!(merged.recordings_dir, Some("/srv/takes".to_string()));
        assert_eq!(merged.silent_mode_playback, Some(true));
    }

    #[tokio::test]
    async fn broken_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "quality = [").unwrap();
        let store = XdgConfigStore::with_path(path);

        let result = load_merged_config(&store, AppConfig::empty()).await;

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}

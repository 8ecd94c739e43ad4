//! Voice memo controller
//!
//! Owns the recording index and at most one live recording session, and
//! turns user actions (record, stop, play, share, delete) into calls on
//! them. Failures are returned and also kept as a user-facing message.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::recording::{FileUri, RecordingEntry};
use crate::domain::session::{SessionFailure, SessionPhase};

use super::index::{IndexError, RecordingIndex};
use super::ports::{
    AudioPlayer, AudioRecorder, CaptureConfig, FileStore, KeyValueStore, MicrophonePermission,
    PlaybackError, ShareError, ShareTarget, StorageError,
};
use super::session::{RecordingSession, SessionError};

/// Coarse error classes shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PermissionDenied,
    DeviceError,
    StorageError,
    CorruptIndex,
    Usage,
}

/// Errors from the memo controller
#[derive(Debug, Clone, Error)]
pub enum MemoError {
    #[error("A recording is already in progress")]
    SessionInProgress,

    #[error("No recording in progress")]
    NoActiveSession,

    #[error("{0}")]
    StartFailed(SessionFailure),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Share(#[from] ShareError),

    #[error("No recording matches \"{0}\"")]
    UnknownRecording(String),
}

impl MemoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SessionInProgress | Self::NoActiveSession | Self::UnknownRecording(_) => {
                ErrorKind::Usage
            }
            Self::StartFailed(SessionFailure::PermissionDenied) => ErrorKind::PermissionDenied,
            Self::StartFailed(SessionFailure::Device { .. }) => ErrorKind::DeviceError,
            Self::Session(SessionError::InvalidState(_)) => ErrorKind::Usage,
            Self::Session(SessionError::Device { .. }) => ErrorKind::DeviceError,
            Self::Index(IndexError::Corrupt(_)) => ErrorKind::CorruptIndex,
            Self::Index(IndexError::NotFound(_)) => ErrorKind::Usage,
            Self::Index(IndexError::Storage(_)) => ErrorKind::StorageError,
            Self::Playback(_) | Self::Share(_) => ErrorKind::DeviceError,
        }
    }

    /// Everything but a corrupt index can be retried
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::CorruptIndex
    }
}

impl From<StorageError> for MemoError {
    fn from(err: StorageError) -> Self {
        Self::Index(IndexError::Storage(err))
    }
}

/// How the user names a recording: a 1-based take number or its uri
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntrySelector {
    Take(usize),
    Uri(FileUri),
}

impl FromStr for EntrySelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Expected a take number or a recording uri".to_string());
        }
        if s.chars().all(|c| c.is_ascii_digit()) {
            return s
                .parse()
                .map(Self::Take)
                .map_err(|e| format!("Invalid take number \"{}\": {}", s, e));
        }
        Ok(Self::Uri(FileUri::new(s)))
    }
}

impl fmt::Display for EntrySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Take(n) => write!(f, "take {}", n),
            Self::Uri(uri) => write!(f, "{}", uri),
        }
    }
}

/// A listed recording with its display position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Take<'a> {
    pub number: usize,
    pub entry: &'a RecordingEntry,
}

impl fmt::Display for Take<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Take {} - {}", self.number, self.entry.display_duration())
    }
}

/// Voice memo controller
pub struct MemoController<P, R, L, S, F, T>
where
    P: MicrophonePermission,
    R: AudioRecorder,
    L: AudioPlayer,
    S: KeyValueStore,
    F: FileStore,
    T: ShareTarget,
{
    permission: Arc<P>,
    recorder: Arc<R>,
    player: Arc<L>,
    share: T,
    index: RecordingIndex<S, F>,
    capture: CaptureConfig,
    session: Option<RecordingSession<P, R, L>>,
    message: Option<String>,
}

impl<P, R, L, S, F, T> MemoController<P, R, L, S, F, T>
where
    P: MicrophonePermission,
    R: AudioRecorder,
    L: AudioPlayer,
    S: KeyValueStore,
    F: FileStore,
    T: ShareTarget,
{
    /// Create a controller over an index. The index is used as-is; call
    /// [`reload`](Self::reload) or pass an opened index to see persisted
    /// recordings.
    pub fn new(
        permission: P,
        recorder: R,
        player: L,
        share: T,
        index: RecordingIndex<S, F>,
        capture: CaptureConfig,
    ) -> Self {
        Self {
            permission: Arc::new(permission),
            recorder: Arc::new(recorder),
            player: Arc::new(player),
            share,
            index,
            capture,
            session: None,
            message: None,
        }
    }

    /// Last user-facing failure message, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn index(&self) -> &RecordingIndex<S, F> {
        &self.index
    }

    pub fn is_recording(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_active())
    }

    /// Recordings in display order, numbered from 1
    pub fn takes(&self) -> impl Iterator<Item = Take<'_>> {
        self.index
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| Take {
                number: i + 1,
                entry,
            })
    }

    /// Re-read the persisted index
    pub async fn reload(&mut self) -> Result<usize, MemoError> {
        let result = self.index.load().await.map(|entries| entries.len());
        self.record(result.map_err(MemoError::from))
    }

    /// Start a new recording session.
    ///
    /// Permission denial and device failures during start land the session
    /// in Failed; they are returned as [`MemoError::StartFailed`] and kept
    /// as the message.
    pub async fn begin_recording(&mut self) -> Result<(), MemoError> {
        if self.is_recording() {
            return self.record(Err(MemoError::SessionInProgress));
        }

        let mut session = RecordingSession::new(
            Arc::clone(&self.permission),
            Arc::clone(&self.recorder),
            Arc::clone(&self.player),
            self.capture,
        );
        let result = match session.start().await {
            Ok(SessionPhase::Active) => {
                self.session = Some(session);
                Ok(())
            }
            Ok(_) => match session.failure() {
                Some(failure) => Err(MemoError::StartFailed(failure.clone())),
                None => Err(MemoError::NoActiveSession),
            },
            Err(err) => Err(MemoError::Session(err.into())),
        };

        self.record(result)
    }

    /// Stop the live session and add the take to the index
    pub async fn finish_recording(&mut self) -> Result<RecordingEntry, MemoError> {
        let result = self.finish_inner().await;
        self.record(result)
    }

    async fn finish_inner(&mut self) -> Result<RecordingEntry, MemoError> {
        let mut session = match self.session.take() {
            Some(session) if session.is_active() => session,
            _ => return Err(MemoError::NoActiveSession),
        };

        let finalized = session.stop().await?;
        if let Err(err) = self.index.append(finalized.entry.clone()).await {
            warn!(uri = %finalized.entry.file_uri(), "Take recorded but not indexed");
            return Err(err.into());
        }
        info!(take = self.index.len(), "Take saved");

        Ok(finalized.entry)
    }

    /// Look up a recording
    pub fn resolve(&self, selector: &EntrySelector) -> Result<RecordingEntry, MemoError> {
        let found = match selector {
            EntrySelector::Take(n) => self.index.find_take(*n),
            EntrySelector::Uri(uri) => self.index.get(uri),
        };
        found
            .cloned()
            .ok_or_else(|| MemoError::UnknownRecording(selector.to_string()))
    }

    /// Load a recording and play it to the end.
    ///
    /// A file missing from disk is a recoverable playback error.
    pub async fn play(&mut self, selector: &EntrySelector) -> Result<RecordingEntry, MemoError> {
        let result = self.play_inner(selector).await;
        self.record(result)
    }

    async fn play_inner(&self, selector: &EntrySelector) -> Result<RecordingEntry, MemoError> {
        let entry = self.resolve(selector)?;
        let loaded = self.player.load_for_playback(entry.file_uri()).await?;
        self.player.replay(&loaded.handle).await?;
        Ok(entry)
    }

    /// Hand a recording to the share target
    pub async fn share(&mut self, selector: &EntrySelector) -> Result<RecordingEntry, MemoError> {
        let result = self.share_inner(selector).await;
        self.record(result)
    }

    async fn share_inner(&self, selector: &EntrySelector) -> Result<RecordingEntry, MemoError> {
        let entry = self.resolve(selector)?;
        self.share.share(entry.file_uri()).await?;
        Ok(entry)
    }

    /// Delete a recording's file and remove it from the index
    pub async fn delete(&mut self, selector: &EntrySelector) -> Result<RecordingEntry, MemoError> {
        let result = match self.resolve(selector) {
            Ok(entry) => self
                .index
                .remove(entry.file_uri())
                .await
                .map(|_| entry)
                .map_err(MemoError::from),
            Err(err) => Err(err),
        };
        self.record(result)
    }

    /// Keep the outcome's message for the UI and pass the outcome through
    fn record<V>(&mut self, result: Result<V, MemoError>) -> Result<V, MemoError> {
        match &result {
            Ok(_) => self.message = None,
            Err(err) => {
                warn!(error = %err, kind = ?err.kind(), "Operation failed");
                self.message = Some(err.to_string());
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::index::tests::{entry, MockFiles, MockStore};
    use crate::application::session::tests::{MockPermission, MockPlayer, MockRecorder};
    use crate::domain::session::PERMISSION_DENIED_MESSAGE;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockShare {
        shared: Arc<Mutex<Vec<FileUri>>>,
        fail: Arc<AtomicBool>,
    }

    #[async_trait]
    impl ShareTarget for MockShare {
        async fn share(&self, uri: &FileUri) -> Result<(), ShareError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ShareError::Unavailable("no clipboard".to_string()));
            }
            self.shared.lock().unwrap().push(uri.clone());
            Ok(())
        }
    }

    type TestController =
        MemoController<MockPermission, MockRecorder, MockPlayer, MockStore, MockFiles, MockShare>;

    fn controller_with(permission: MockPermission, store: MockStore) -> TestController {
        MemoController::new(
            permission,
            MockRecorder::default(),
            MockPlayer::with_duration(4_400),
            MockShare::default(),
            RecordingIndex::new(store, MockFiles::default()),
            CaptureConfig::default(),
        )
    }

    #[tokio::test]
    async fn record_cycle_appends_and_persists() {
        let store = MockStore::default();
        let mut controller = controller_with(MockPermission::granted(), store.clone());

        controller.begin_recording().await.unwrap();
        assert!(controller.is_recording());

        let saved = controller.finish_recording().await.unwrap();
        assert!(!controller.is_recording());
        assert_eq!(saved.display_duration(), "0:04");
        assert_eq!(controller.index().entries(), &[saved.clone()]);

        let reloaded = RecordingIndex::open(store, MockFiles::default())
            .await
            .unwrap();
        assert_eq!(reloaded.entries(), &[saved]);
    }

    #[tokio::test]
    async fn second_begin_while_recording_is_rejected() {
        let mut controller = controller_with(MockPermission::granted(), MockStore::default());
        controller.begin_recording().await.unwrap();

        let err = controller.begin_recording().await.unwrap_err();
        assert!(matches!(err, MemoError::SessionInProgress));
        assert!(controller.is_recording());
    }

    #[tokio::test]
    async fn denied_permission_sets_message() {
        let mut controller = controller_with(MockPermission::denied(), MockStore::default());

        let err = controller.begin_recording().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert!(err.is_recoverable());
        assert_eq!(controller.message(), Some(PERMISSION_DENIED_MESSAGE));
        assert!(!controller.is_recording());
    }

    #[tokio::test]
    async fn finish_without_session_leaves_storage_alone() {
        let store = MockStore::default();
        let mut controller = controller_with(MockPermission::granted(), store.clone());

        let err = controller.finish_recording().await.unwrap_err();
        assert!(matches!(err, MemoError::NoActiveSession));
        assert!(store.raw().is_none());
    }

    #[tokio::test]
    async fn load_failure_after_capture_is_not_indexed() {
        let store = MockStore::default();
        let player = MockPlayer::with_duration(4_400);
        player.fail_load.store(true, Ordering::SeqCst);
        let mut controller = MemoController::new(
            MockPermission::granted(),
            MockRecorder::default(),
            player,
            MockShare::default(),
            RecordingIndex::new(store.clone(), MockFiles::default()),
            CaptureConfig::default(),
        );

        controller.begin_recording().await.unwrap();
        let err = controller.finish_recording().await.unwrap_err();

        match &err {
            MemoError::Session(SessionError::Device { partial_file, .. }) => assert_eq!(
                partial_file.as_ref().map(|uri| uri.as_str()),
                Some("file:///takes/take-0.wav")
            ),
            other => panic!("expected a device error, got {other}"),
        }
        assert_eq!(err.kind(), ErrorKind::DeviceError);
        assert!(controller.index().is_empty());
        assert!(store.raw().is_none());
        assert!(!controller.is_recording());
        assert!(controller.message().is_some());
    }

    #[tokio::test]
    async fn persist_failure_after_capture_adds_no_entry() {
        let store = MockStore::default();
        let mut controller = controller_with(MockPermission::granted(), store.clone());
        controller.begin_recording().await.unwrap();
        store.fail_set.store(true, Ordering::SeqCst);

        let err = controller.finish_recording().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StorageError);
        assert!(err.is_recoverable());
        assert!(controller.index().is_empty());
        assert!(store.raw().is_none());
        assert!(!controller.is_recording());
    }

    #[tokio::test]
    async fn takes_are_numbered_in_order() {
        let store = MockStore::default();
        store.put_raw(
            r#"[{"file":"file:///a.wav","durationMillis":5000},{"file":"file:///b.wav","durationMillis":59500}]"#,
        );
        let mut controller = controller_with(MockPermission::granted(), store);
        assert_eq!(controller.reload().await.unwrap(), 2);

        let lines: Vec<String> = controller.takes().map(|t| t.to_string()).collect();
        assert_eq!(lines, vec!["Take 1 - 0:05", "Take 2 - 1:00"]);
    }

    #[tokio::test]
    async fn corrupt_index_is_not_recoverable() {
        let store = MockStore::default();
        store.put_raw("{{{");
        let mut controller = controller_with(MockPermission::granted(), store);

        let err = controller.reload().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CorruptIndex);
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn play_and_share_use_entry_uri() {
        let share = MockShare::default();
        let mut index = RecordingIndex::new(MockStore::default(), MockFiles::default());
        index.append(entry("a", 1_000)).await.unwrap();
        let player = MockPlayer::with_duration(1_000);
        let mut controller = MemoController::new(
            MockPermission::granted(),
            MockRecorder::default(),
            player,
            share.clone(),
            index,
            CaptureConfig::default(),
        );

        let played = controller.play(&EntrySelector::Take(1)).await.unwrap();
        assert_eq!(played.file_uri().as_str(), "file:///takes/a.wav");
        assert_eq!(controller.player.replays.load(Ordering::SeqCst), 1);

        let uri = EntrySelector::Uri(FileUri::new("file:///takes/a.wav"));
        controller.share(&uri).await.unwrap();
        assert_eq!(share.shared.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_file_on_play_is_recoverable() {
        let mut index = RecordingIndex::new(MockStore::default(), MockFiles::default());
        index.append(entry("gone", 1_000)).await.unwrap();
        let player = MockPlayer::with_duration(1_000);
        player.fail_load.store(true, Ordering::SeqCst);
        let mut controller = MemoController::new(
            MockPermission::granted(),
            MockRecorder::default(),
            player,
            MockShare::default(),
            index,
            CaptureConfig::default(),
        );

        let err = controller.play(&EntrySelector::Take(1)).await.unwrap_err();
        assert!(matches!(err, MemoError::Playback(PlaybackError::FileMissing(_))));
        assert!(err.is_recoverable());
        assert!(controller.message().is_some());
        assert_eq!(controller.index().len(), 1);
    }

    #[tokio::test]
    async fn share_failure_is_surfaced() {
        let share = MockShare::default();
        share.fail.store(true, Ordering::SeqCst);
        let mut index = RecordingIndex::new(MockStore::default(), MockFiles::default());
        index.append(entry("a", 1_000)).await.unwrap();
        let mut controller = MemoController::new(
            MockPermission::granted(),
            MockRecorder::default(),
            MockPlayer::with_duration(1),
            share,
            index,
            CaptureConfig::default(),
        );

        let err = controller.share(&EntrySelector::Take(1)).await.unwrap_err();
        assert!(matches!(err, MemoError::Share(_)));
        assert!(controller.message().unwrap().contains("no clipboard"));
    }

    #[tokio::test]
    async fn delete_by_take_number() {
        let mut controller = controller_with(MockPermission::granted(), MockStore::default());
        controller.begin_recording().await.unwrap();
        let first = controller.finish_recording().await.unwrap();
        controller.begin_recording().await.unwrap();
        let second = controller.finish_recording().await.unwrap();

        let deleted = controller.delete(&EntrySelector::Take(1)).await.unwrap();
        assert_eq!(deleted, first);
        assert_eq!(controller.index().entries(), &[second]);
        assert!(controller.message().is_none());
    }

    #[tokio::test]
    async fn unknown_selector_is_usage_error() {
        let mut controller = controller_with(MockPermission::granted(), MockStore::default());

        let err = controller.delete(&EntrySelector::Take(3)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        assert!(err.to_string().contains("take 3"));
    }

    #[test]
    fn selector_parsing() {
        assert_eq!("2".parse::<EntrySelector>(), Ok(EntrySelector::Take(2)));
        assert_eq!(
            "file:///a.wav".parse::<EntrySelector>(),
            Ok(EntrySelector::Uri(FileUri::new("file:///a.wav")))
        );
        assert!("  ".parse::<EntrySelector>().is_err());
    }
}

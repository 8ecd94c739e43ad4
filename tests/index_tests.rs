//! Recording index persistence tests against the file-backed adapters

use voice_memos::application::ports::KeyValueStore;
use voice_memos::application::{IndexError, RecordingIndex, INDEX_KEY};
use voice_memos::domain::recording::{FileUri, RecordingEntry};
use voice_memos::infrastructure::{JsonFileStore, LocalFileStore, MemoryStore};

fn take_file(dir: &std::path::Path, name: &str) -> FileUri {
    let path = dir.join(name);
    std::fs::write(&path, b"RIFF").unwrap();
    FileUri::from_path(path).unwrap()
}

#[tokio::test]
async fn appended_entries_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    let first = take_file(dir.path(), "a.wav");
    let second = take_file(dir.path(), "b.wav");

    let mut index = RecordingIndex::open(JsonFileStore::new(&storage), LocalFileStore::new())
        .await
        .unwrap();
    index
        .append(RecordingEntry::new(first.clone(), 65_000))
        .await
        .unwrap();
    index
        .append(RecordingEntry::new(second.clone(), 1_499))
        .await
        .unwrap();

    let reopened = RecordingIndex::open(JsonFileStore::new(&storage), LocalFileStore::new())
        .await
        .unwrap();
    let uris: Vec<&FileUri> = reopened.entries().iter().map(|e| e.file_uri()).collect();
    assert_eq!(uris, vec![&first, &second]);
    assert_eq!(reopened.entries()[0].display_duration(), "1:05");
    assert_eq!(reopened.entries()[1].duration_millis(), 1_499);
}

#[tokio::test]
async fn index_is_stored_under_its_key() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    let uri = take_file(dir.path(), "a.wav");

    let mut index = RecordingIndex::new(JsonFileStore::new(&storage), LocalFileStore::new());
    index.append(RecordingEntry::new(uri.clone(), 3_000)).await.unwrap();

    let raw = JsonFileStore::new(&storage)
        .get(INDEX_KEY)
        .await
        .unwrap()
        .expect("index written");
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!([{ "file": uri.as_str(), "durationMillis": 3000 }])
    );
}

#[tokio::test]
async fn legacy_entries_are_rewritten_in_new_form() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    let store = JsonFileStore::new(&storage);
    store
        .set(
            INDEX_KEY,
            r#"[{"file":"file:///old/one.m4a","duration":"1:05"}]"#,
        )
        .await
        .unwrap();

    let mut index = RecordingIndex::open(JsonFileStore::new(&storage), LocalFileStore::new())
        .await
        .unwrap();
    assert_eq!(index.entries()[0].duration_millis(), 65_000);

    let uri = take_file(dir.path(), "new.wav");
    index.append(RecordingEntry::new(uri, 2_000)).await.unwrap();

    let raw = store.get(INDEX_KEY).await.unwrap().unwrap();
    assert!(!raw.contains("\"duration\""));
    assert!(raw.contains("\"durationMillis\":65000"));
}

#[tokio::test]
async fn remove_deletes_file_and_entry() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    let keep = take_file(dir.path(), "keep.wav");
    let gone = take_file(dir.path(), "gone.wav");

    let mut index = RecordingIndex::open(JsonFileStore::new(&storage), LocalFileStore::new())
        .await
        .unwrap();
    index.append(RecordingEntry::new(keep.clone(), 1_000)).await.unwrap();
    index.append(RecordingEntry::new(gone.clone(), 2_000)).await.unwrap();

    assert_eq!(index.remove(&gone).await.unwrap(), 1);
    assert!(!gone.to_path().unwrap().exists());
    assert!(keep.to_path().unwrap().exists());

    let reopened = RecordingIndex::open(JsonFileStore::new(&storage), LocalFileStore::new())
        .await
        .unwrap();
    assert_eq!(reopened.len(), 1);
    assert!(reopened.get(&keep).is_some());
}

#[tokio::test]
async fn remove_entry_whose_file_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    let uri = take_file(dir.path(), "a.wav");

    let mut index = RecordingIndex::new(JsonFileStore::new(&storage), LocalFileStore::new());
    index.append(RecordingEntry::new(uri.clone(), 1_000)).await.unwrap();
    std::fs::remove_file(uri.to_path().unwrap()).unwrap();

    assert_eq!(index.remove(&uri).await.unwrap(), 1);
    assert!(index.is_empty());
}

#[tokio::test]
async fn remove_unknown_uri_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    let indexed = take_file(dir.path(), "a.wav");
    let stray = take_file(dir.path(), "stray.wav");

    let mut index = RecordingIndex::new(JsonFileStore::new(&storage), LocalFileStore::new());
    index.append(RecordingEntry::new(indexed, 1_000)).await.unwrap();

    let result = index.remove(&stray).await;

    assert_eq!(result, Err(IndexError::NotFound(stray.clone())));
    assert!(stray.to_path().unwrap().exists());
    assert_eq!(index.len(), 1);
}

#[tokio::test]
async fn corrupt_index_is_reported_and_kept() {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");
    JsonFileStore::new(&storage)
        .set(INDEX_KEY, "{\"not\": \"a list\"}")
        .await
        .unwrap();

    let result = RecordingIndex::open(JsonFileStore::new(&storage), LocalFileStore::new()).await;

    assert!(matches!(result, Err(IndexError::Corrupt(_))));
    let raw = JsonFileStore::new(&storage).get(INDEX_KEY).await.unwrap();
    assert_eq!(raw.as_deref(), Some("{\"not\": \"a list\"}"));
}

#[tokio::test]
async fn memory_store_shares_index_between_clones() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::new();
    let uri = take_file(dir.path(), "a.wav");

    let mut index = RecordingIndex::new(store.clone(), LocalFileStore::new());
    index.append(RecordingEntry::new(uri.clone(), 4_200)).await.unwrap();

    let other = RecordingIndex::open(store, LocalFileStore::new()).await.unwrap();
    assert_eq!(other.find_take(1).map(|e| e.file_uri()), Some(&uri));
}

// Integration tests for session persistence

use crate::common::{create_session, create_test_services, SAMPLE_MANUAL};
use pagesplit::core::config::Config;
use pagesplit::core::services::Services;
use pagesplit::core::storage::SessionStore;
use pagesplit::core::types::{ChunkMetadata, ChunkStrategy, ContentType, SplitMode};
use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;

fn reopen(data_dir: &std::path::Path) -> Services {
    let mut config = Config::default();
    config.storage.data_dir = data_dir.to_path_buf();
    Services::new(config)
}

#[test]
fn test_session_written_on_create() {
    let (services, temp) = create_test_services();
    let session = create_session(&services, &SAMPLE_MANUAL, ChunkStrategy::default());

    let path = temp
        .path()
        .join("sessions")
        .join(format!("{}.json", session.session_id));
    assert!(path.is_file());

    let store = SessionStore::new(temp.path());
    let stored = store.load(&session.session_id).unwrap();
    assert_eq!(stored, *session);
}

#[test]
fn test_reload_after_edits() {
    let (services, temp) = create_test_services();
    let session = create_session(&services, &SAMPLE_MANUAL, ChunkStrategy::default());
    let id = session.session_id.clone();

    let edited = session.current_text.replace("Overview", "Introduction");
    services.revisions.replace_text(&id, 1, &edited).unwrap();
    let metadata = ChunkMetadata {
        content_type: ContentType::Caption,
        ..Default::default()
    };
    services
        .revisions
        .set_chunk_metadata(&id, "P001-C001", metadata.clone())
        .unwrap();
    drop(services);

    let reopened = reopen(temp.path());
    let loaded = reopened.revisions.session(&id).unwrap();

    assert_eq!(loaded.version, 2);
    assert_eq!(loaded.current_text, edited);
    assert_eq!(loaded.base_pages, session.base_pages);
    assert_eq!(loaded.chunk_metadata.get("P001-C001"), Some(&metadata));

    // Edits continue from the persisted version
    let revision = reopened
        .revisions
        .replace_text(&id, 2, &session.current_text)
        .unwrap();
    assert_eq!(revision.version, 3);
}

#[test]
fn test_list_reads_from_disk() {
    let (services, temp) = create_test_services();
    create_session(&services, &["one"], ChunkStrategy::default());
    create_session(&services, &["two"], ChunkStrategy::default());

    let reopened = reopen(temp.path());
    assert_eq!(reopened.revisions.list_sessions().unwrap().len(), 2);
}

#[test]
fn test_list_skips_corrupt_files() {
    let (services, temp) = create_test_services();
    let session = create_session(&services, &["valid"], ChunkStrategy::default());

    let sessions_dir = temp.path().join("sessions");
    fs::write(sessions_dir.join("broken.json"), "{ not json").unwrap();
    fs::write(sessions_dir.join("notes.txt"), "ignored").unwrap();

    let listed = services.revisions.list_sessions().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].session_id, session.session_id);
}

#[test]
fn test_delete_removes_file() {
    let (services, temp) = create_test_services();
    let session = create_session(&services, &["doomed"], ChunkStrategy::default());
    let store = SessionStore::new(temp.path());
    assert!(store.exists(&session.session_id));

    services.revisions.delete_session(&session.session_id).unwrap();

    assert!(!store.exists(&session.session_id));
    let reopened = reopen(temp.path());
    assert!(reopened.revisions.session(&session.session_id).unwrap_err().is_not_found());
}

#[test]
fn test_unsafe_session_ids_rejected() {
    let (_services, temp) = create_test_services();
    let store = SessionStore::new(temp.path());

    for id in ["../escape", "a/b", "", ".hidden"] {
        assert!(!store.exists(id));
        let err = store.load(id).unwrap_err();
        assert_eq!(err.code(), "STORAGE_ERROR");
    }
}

#[test]
fn test_failed_edit_leaves_file_untouched() {
    let (services, temp) = create_test_services();
    let session = create_session(&services, &["stable"], ChunkStrategy::default());
    let path = temp
        .path()
        .join("sessions")
        .join(format!("{}.json", session.session_id));
    let before = fs::read_to_string(&path).unwrap();

    assert!(services
        .revisions
        .replace_text(&session.session_id, 1, "no markers")
        .is_err());

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_stale_writer_in_other_process_conflicts() {
    let (writer_a, temp) = create_test_services();
    let session = create_session(&writer_a, &["shared draft"], ChunkStrategy::default());
    let id = session.session_id.clone();

    // Second process opens the session at version 1
    let writer_b = reopen(temp.path());
    assert_eq!(writer_b.revisions.session(&id).unwrap().version, 1);

    let first = writer_a
        .revisions
        .replace_text(&id, 1, "<<<PAGE:1>>>\nAAAA edit")
        .unwrap();
    assert_eq!(first.version, 2);

    let err = writer_b
        .revisions
        .replace_text(&id, 1, "<<<PAGE:1>>>\nBBBB edit")
        .unwrap_err();
    assert_eq!(err.code(), "VERSION_CONFLICT");
    assert!(err.to_string().contains("current version is 2"));

    let stored = SessionStore::new(temp.path()).load(&id).unwrap();
    assert_eq!(stored.version, 2);
    assert!(stored.current_text.contains("AAAA"));
    assert!(!stored.current_text.contains("BBBB"));
}

#[test]
fn test_racing_processes_have_one_winner() {
    let (creator, temp) = create_test_services();
    let session = create_session(&creator, &["race me"], ChunkStrategy::default());
    let id = session.session_id.clone();

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = ["AAAA", "BBBB"]
        .into_iter()
        .map(|tag| {
            let services = reopen(temp.path());
            let barrier = Arc::clone(&barrier);
            let id = id.clone();
            thread::spawn(move || {
                let text = format!("<<<PAGE:1>>>\n{tag} edit");
                barrier.wait();
                services.revisions.replace_text(&id, 1, &text)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.code(), "VERSION_CONFLICT");
    }

    let stored = SessionStore::new(temp.path()).load(&id).unwrap();
    assert_eq!(stored.version, 2);
}

#[test]
fn test_metadata_write_keeps_other_process_edit() {
    let (writer_a, temp) = create_test_services();
    let session = create_session(&writer_a, &["original text here"], ChunkStrategy::default());
    let id = session.session_id.clone();

    let writer_b = reopen(temp.path());
    writer_b.revisions.session(&id).unwrap();

    writer_a
        .revisions
        .replace_text(&id, 1, "<<<PAGE:1>>>\nrevised text here")
        .unwrap();

    let metadata = ChunkMetadata {
        content_type: ContentType::Table,
        ..Default::default()
    };
    writer_b
        .revisions
        .set_chunk_metadata(&id, "P001-C001", metadata.clone())
        .unwrap();

    let stored = SessionStore::new(temp.path()).load(&id).unwrap();
    assert_eq!(stored.version, 2);
    assert!(stored.current_text.contains("revised"));
    assert_eq!(stored.chunk_metadata.get("P001-C001"), Some(&metadata));
    assert_eq!(writer_b.revisions.session(&id).unwrap().version, 2);
}

#[test]
fn test_metadata_for_chunk_removed_by_other_process() {
    let (writer_a, temp) = create_test_services();
    let long_page = "word ".repeat(50);
    let strategy = ChunkStrategy::new(100, 0, SplitMode::Chars, false);
    let session = create_session(&writer_a, &[long_page.trim_end()], strategy);
    let id = session.session_id.clone();
    assert!(session.chunk("P001-C003").is_some());

    let writer_b = reopen(temp.path());
    writer_b.revisions.session(&id).unwrap();

    writer_a
        .revisions
        .replace_text(&id, 1, "<<<PAGE:1>>>\nnow a short page")
        .unwrap();

    let err = writer_b
        .revisions
        .set_chunk_metadata(&id, "P001-C003", ChunkMetadata::default())
        .unwrap_err();
    assert_eq!(err.code(), "CHUNK_NOT_FOUND");

    let stored = SessionStore::new(temp.path()).load(&id).unwrap();
    assert_eq!(stored.version, 2);
    assert!(stored.chunk_metadata.is_empty());
}

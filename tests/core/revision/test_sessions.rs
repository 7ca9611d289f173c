// Integration tests for session creation, lookup and metadata

use crate::common::{
    assert_chunk_invariants, create_session, create_test_services, numbered_pages, slice_chars,
    SAMPLE_MANUAL,
};
use pagesplit::core::error::PagesplitError;
use pagesplit::core::types::{
    ChunkMetadata, ChunkStrategy, ContentType, ExtractMeta, QualityFlag, RawPage, SplitMode,
};

#[test]
fn test_session_creation() {
    let (services, _temp) = create_test_services();

    let session = create_session(&services, &SAMPLE_MANUAL, ChunkStrategy::default());

    assert_eq!(session.version, 1);
    assert_eq!(session.doc_id, "test-doc");
    assert_eq!(session.page_map.len(), 3);
    assert!(!session.chunks.is_empty());
    assert!(session.chunk_metadata.is_empty());
    assert_eq!(session.created_at, session.updated_at);
    assert_chunk_invariants(&session);
}

#[test]
fn test_session_ids_are_unique() {
    let (services, _temp) = create_test_services();

    let a = create_session(&services, &["alpha"], ChunkStrategy::default());
    let b = create_session(&services, &["alpha"], ChunkStrategy::default());

    assert_ne!(a.session_id, b.session_id);
}

#[test]
fn test_base_pages_keep_raw_text() {
    let (services, _temp) = create_test_services();

    let session = create_session(&services, &["line one\r\nline two"], ChunkStrategy::default());

    assert_eq!(session.base_pages[0].text, "line one\r\nline two");
    assert_eq!(session.current_pages[0].text, "line one\nline two");
}

#[test]
fn test_create_sorts_unordered_pages() {
    let (services, _temp) = create_test_services();
    let pages = vec![RawPage::new(2, "second"), RawPage::new(1, "first")];
    let meta = ExtractMeta::new("test-extractor", "0.1.0", 2);

    let session = services
        .revisions
        .create_session("doc", meta, pages, ChunkStrategy::default())
        .unwrap();

    assert_eq!(session.base_pages[0].page_no, 1);
    assert!(session.current_text.starts_with("<<<PAGE:1>>>\nfirst"));
}

#[test]
fn test_create_rejects_bad_pages() {
    let (services, _temp) = create_test_services();
    let strategy = ChunkStrategy::default();

    let cases: Vec<(Vec<RawPage>, u32)> = vec![
        // Declared count disagrees with the list
        (numbered_pages(&["a", "b"]), 3),
        // Duplicate numbers
        (vec![RawPage::new(1, "a"), RawPage::new(1, "b")], 2),
        // Gap
        (vec![RawPage::new(1, "a"), RawPage::new(3, "c")], 2),
        // Zero-based
        (vec![RawPage::new(0, "a")], 1),
        // Marker token inside page text
        (numbered_pages(&["see <<<PAGE:7>>> here"]), 1),
    ];

    for (pages, declared) in cases {
        let meta = ExtractMeta::new("test-extractor", "0.1.0", declared);
        let err = services
            .revisions
            .create_session("doc", meta, pages, strategy.clone())
            .unwrap_err();

        assert!(matches!(err, PagesplitError::InvalidPages(_)), "got {err:?}");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    assert!(services.revisions.list_sessions().unwrap().is_empty());
}

#[test]
fn test_create_rejects_strategy_outside_limits() {
    let (services, _temp) = create_test_services();

    for strategy in [
        ChunkStrategy::new(50, 0, SplitMode::Chars, true),
        ChunkStrategy::new(200, 200, SplitMode::Chars, true),
        ChunkStrategy::new(20_000, 100, SplitMode::Paragraph, true),
        ChunkStrategy::new(5000, 2000, SplitMode::Paragraph, true),
    ] {
        let meta = ExtractMeta::new("test-extractor", "0.1.0", 1);
        let err = services
            .revisions
            .create_session("doc", meta, numbered_pages(&["text"]), strategy)
            .unwrap_err();
        assert!(matches!(err, PagesplitError::InvalidStrategy(_)));
    }
}

#[test]
fn test_session_not_found() {
    let (services, _temp) = create_test_services();

    let err = services.revisions.session("missing").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.code(), "SESSION_NOT_FOUND");
}

#[test]
fn test_chunk_detail() {
    let (services, _temp) = create_test_services();
    let session = create_session(&services, &SAMPLE_MANUAL, ChunkStrategy::default());
    let chunk = &session.chunks[0];

    let detail = services
        .revisions
        .chunk_detail(&session.session_id, &chunk.chunk_id)
        .unwrap();

    assert_eq!(detail.doc_id, "test-doc");
    assert_eq!(detail.page_no, 1);
    assert_eq!(detail.text, slice_chars(&session.current_text, chunk.start, chunk.end));
    assert!(detail.text.starts_with("INSTALLATION GUIDE"));
    assert_eq!(detail.hash, chunk.hash);
    assert_eq!(detail.extractor_version, "0.1.0");
    assert_eq!(detail.chunk_strategy, ChunkStrategy::default());
    assert_eq!(detail.metadata, ChunkMetadata::default());
    assert_eq!(detail.version, 1);
}

#[test]
fn test_chunk_detail_unknown_chunk() {
    let (services, _temp) = create_test_services();
    let session = create_session(&services, &["only page"], ChunkStrategy::default());

    let err = services
        .revisions
        .chunk_detail(&session.session_id, "P009-C001")
        .unwrap_err();

    assert!(matches!(err, PagesplitError::ChunkNotFound { .. }));
}

#[test]
fn test_set_chunk_metadata_keeps_version() {
    let (services, _temp) = create_test_services();
    let session = create_session(&services, &SAMPLE_MANUAL, ChunkStrategy::default());
    let chunk_id = session.chunks[0].chunk_id.clone();

    let mut custom = serde_json::Map::new();
    custom.insert("reviewer".to_string(), serde_json::json!("qa"));
    let metadata = ChunkMetadata {
        content_type: ContentType::Table,
        heading_path: "Installation Guide > Parts".to_string(),
        note: "columns misaligned".to_string(),
        quality_flag: QualityFlag::Suspect,
        custom,
    };

    let stored = services
        .revisions
        .set_chunk_metadata(&session.session_id, &chunk_id, metadata.clone())
        .unwrap();
    assert_eq!(stored, metadata);

    let after = services.revisions.session(&session.session_id).unwrap();
    assert_eq!(after.version, 1);
    assert_eq!(after.chunk_metadata.get(&chunk_id), Some(&metadata));
    assert!(after.updated_at >= session.updated_at);

    let detail = services
        .revisions
        .chunk_detail(&session.session_id, &chunk_id)
        .unwrap();
    assert_eq!(detail.metadata, metadata);
}

#[test]
fn test_set_metadata_unknown_chunk() {
    let (services, _temp) = create_test_services();
    let session = create_session(&services, &["only page"], ChunkStrategy::default());

    let err = services
        .revisions
        .set_chunk_metadata(&session.session_id, "P001-C099", ChunkMetadata::default())
        .unwrap_err();

    assert!(err.is_not_found());
    let after = services.revisions.session(&session.session_id).unwrap();
    assert!(after.chunk_metadata.is_empty());
}

#[test]
fn test_list_and_delete_sessions() {
    let (services, _temp) = create_test_services();
    let first = create_session(&services, &["first document"], ChunkStrategy::default());
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = create_session(&services, &["second document"], ChunkStrategy::default());

    let listed = services.revisions.list_sessions().unwrap();
    assert_eq!(listed.len(), 2);
    // Most recently updated first
    assert_eq!(listed[0].session_id, second.session_id);
    assert_eq!(listed[1].session_id, first.session_id);
    assert_eq!(listed[0].page_count, 1);

    services.revisions.delete_session(&first.session_id).unwrap();

    let listed = services.revisions.list_sessions().unwrap();
    assert_eq!(listed.len(), 1);
    assert!(services.revisions.session(&first.session_id).is_err());

    let err = services.revisions.delete_session(&first.session_id).unwrap_err();
    assert!(err.is_not_found());
}

// Integration tests for text and strategy edits

use crate::common::{assert_chunk_invariants, create_session, create_test_services, SAMPLE_MANUAL};
use pagesplit::core::error::{MarkerError, PagesplitError};
use pagesplit::core::segment::encode;
use pagesplit::core::types::{ChunkMetadata, ChunkStrategy, QualityFlag, SplitMode};

fn chars_strategy() -> ChunkStrategy {
    ChunkStrategy::new(100, 0, SplitMode::Chars, false)
}

#[test]
fn test_replace_text_commits_new_revision() {
    let (services, _temp) = create_test_services();
    let session = create_session(
        &services,
        &["First page body text here", "Second page body text"],
        ChunkStrategy::default(),
    );

    let edited = session.current_text.replace("Second page", "Revised second page");
    let revision = services
        .revisions
        .replace_text(&session.session_id, 1, &edited)
        .unwrap();

    assert_eq!(revision.version, 2);
    assert_eq!(revision.current_text, edited);
    assert!(revision.orphaned_metadata.is_empty());

    let after = services.revisions.session(&session.session_id).unwrap();
    assert_eq!(after.version, 2);
    assert_eq!(after.current_pages[1].text, "Revised second page body text");
    assert_eq!(after.base_pages, session.base_pages);
    assert_eq!(after.page_map, revision.page_map);
    assert_eq!(after.chunks, revision.chunks);
    assert!(after.updated_at >= session.updated_at);
    assert_chunk_invariants(&after);
}

#[test]
fn test_replace_text_normalizes() {
    let (services, _temp) = create_test_services();
    let session = create_session(&services, &["body"], ChunkStrategy::default());

    let revision = services
        .revisions
        .replace_text(&session.session_id, 1, "<<<PAGE:1>>>\nnew\r\nbody\n\n\n\n\nend")
        .unwrap();

    assert_eq!(revision.current_text, "<<<PAGE:1>>>\nnew\nbody\n\n\nend");
}

#[test]
fn test_replace_text_rejects_broken_markers() {
    let (services, _temp) = create_test_services();
    let session = create_session(&services, &["one", "two", "three"], ChunkStrategy::default());

    let broken = session.current_text.replace("<<<PAGE:2>>>", "");
    let err = services
        .revisions
        .replace_text(&session.session_id, 1, &broken)
        .unwrap_err();

    assert!(matches!(
        err,
        PagesplitError::PageMarkerInvalid(MarkerError::MissingPages { .. })
    ));

    let after = services.revisions.session(&session.session_id).unwrap();
    assert_eq!(after.version, 1);
    assert_eq!(after.current_text, session.current_text);
}

#[test]
fn test_replace_text_stale_version() {
    let (services, _temp) = create_test_services();
    let session = create_session(&services, &["original"], ChunkStrategy::default());
    let id = &session.session_id;

    services
        .revisions
        .replace_text(id, 1, "<<<PAGE:1>>>\nfirst edit")
        .unwrap();

    let err = services
        .revisions
        .replace_text(id, 1, "<<<PAGE:1>>>\nsecond edit")
        .unwrap_err();

    assert!(matches!(
        err,
        PagesplitError::VersionConflict {
            expected: 1,
            actual: 2
        }
    ));
    assert!(err.is_conflict());

    let after = services.revisions.session(id).unwrap();
    assert_eq!(after.current_pages[0].text, "first edit");
}

#[test]
fn test_version_conflict_checked_before_markers() {
    let (services, _temp) = create_test_services();
    let session = create_session(&services, &["original"], ChunkStrategy::default());

    let err = services
        .revisions
        .replace_text(&session.session_id, 7, "no markers at all")
        .unwrap_err();

    assert!(matches!(err, PagesplitError::VersionConflict { .. }));
}

#[test]
fn test_versions_are_monotonic() {
    let (services, _temp) = create_test_services();
    let session = create_session(&services, &SAMPLE_MANUAL, ChunkStrategy::default());
    let id = &session.session_id;

    let mut version = session.version;
    for step in 0..3 {
        let text = format!("{}\nappendix {step}", services.revisions.session(id).unwrap().current_text);
        version = services.revisions.replace_text(id, version, &text).unwrap().version;
        assert_eq!(version, 2 + step);
    }

    let strategy = ChunkStrategy::new(200, 20, SplitMode::Heading, true);
    let revision = services
        .revisions
        .replace_strategy(id, version, strategy.clone())
        .unwrap();
    assert_eq!(revision.version, 5);
    assert_eq!(revision.chunk_strategy, strategy);
}

#[test]
fn test_replace_strategy_rebuilds_from_base_pages() {
    let (services, _temp) = create_test_services();
    let session = create_session(&services, &SAMPLE_MANUAL, ChunkStrategy::default());
    let id = &session.session_id;

    let edited = session.current_text.replace("pump assembly", "valve assembly");
    services.revisions.replace_text(id, 1, &edited).unwrap();

    let strategy = ChunkStrategy::new(150, 30, SplitMode::Chars, false);
    let revision = services
        .revisions
        .replace_strategy(id, 2, strategy.clone())
        .unwrap();

    let after = services.revisions.session(id).unwrap();
    assert_eq!(after.version, 3);
    assert_eq!(after.chunk_strategy, strategy);
    assert_eq!(after.current_pages, session.base_pages);
    assert_eq!(after.current_text, encode(&session.base_pages));
    assert!(after.current_text.contains("pump assembly"));
    assert_eq!(after.chunks, revision.chunks);
    assert!(after.chunks.len() > session.chunks.len());
    assert_chunk_invariants(&after);
}

#[test]
fn test_replace_strategy_rejects_invalid() {
    let (services, _temp) = create_test_services();
    let session = create_session(&services, &["text"], ChunkStrategy::default());

    let err = services
        .revisions
        .replace_strategy(&session.session_id, 1, ChunkStrategy::new(300, 300, SplitMode::Chars, true))
        .unwrap_err();
    assert!(matches!(err, PagesplitError::InvalidStrategy(_)));

    let err = services
        .revisions
        .replace_strategy(&session.session_id, 3, ChunkStrategy::default())
        .unwrap_err();
    assert!(matches!(err, PagesplitError::VersionConflict { expected: 3, actual: 1 }));
}

#[test]
fn test_metadata_orphaned_by_edit() {
    let (services, _temp) = create_test_services();
    let long_page = "word ".repeat(50);
    let session = create_session(&services, &[long_page.trim_end()], chars_strategy());
    let id = &session.session_id;
    assert_eq!(session.chunks.len(), 3);

    let kept = ChunkMetadata {
        quality_flag: QualityFlag::Good,
        note: "intro".to_string(),
        ..Default::default()
    };
    let dropped = ChunkMetadata {
        quality_flag: QualityFlag::Broken,
        ..Default::default()
    };
    services.revisions.set_chunk_metadata(id, "P001-C001", kept.clone()).unwrap();
    services.revisions.set_chunk_metadata(id, "P001-C003", dropped).unwrap();

    let revision = services
        .revisions
        .replace_text(id, 1, "<<<PAGE:1>>>\nA much shorter page.")
        .unwrap();

    assert_eq!(revision.chunks.len(), 1);
    assert_eq!(revision.orphaned_metadata, vec!["P001-C003".to_string()]);

    let after = services.revisions.session(id).unwrap();
    assert_eq!(after.chunk_metadata.len(), 1);
    assert_eq!(after.chunk_metadata.get("P001-C001"), Some(&kept));
}

#[test]
fn test_metadata_survives_strategy_change_when_chunk_remains() {
    let (services, _temp) = create_test_services();
    let session = create_session(&services, &SAMPLE_MANUAL, ChunkStrategy::default());
    let id = &session.session_id;

    services
        .revisions
        .set_chunk_metadata(id, "P002-C001", ChunkMetadata::default())
        .unwrap();

    let revision = services
        .revisions
        .replace_strategy(id, 1, ChunkStrategy::new(1000, 100, SplitMode::Heading, true))
        .unwrap();

    assert!(revision.orphaned_metadata.is_empty());
    let after = services.revisions.session(id).unwrap();
    assert!(after.chunk_metadata.contains_key("P002-C001"));
}

#[test]
fn test_snapshot_outlives_edit() {
    let (services, _temp) = create_test_services();
    let snapshot = create_session(&services, &["before"], ChunkStrategy::default());

    services
        .revisions
        .replace_text(&snapshot.session_id, 1, "<<<PAGE:1>>>\nafter")
        .unwrap();

    assert_eq!(snapshot.version, 1);
    assert_eq!(snapshot.current_pages[0].text, "before");
}

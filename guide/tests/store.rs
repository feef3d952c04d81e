use std::fs;

use guide::block::Block;
use guide::{DocumentStore, StoreError};
use pretty_assertions::assert_eq;

#[test]
fn bundled_guides_are_listed_in_order() {
    let store = DocumentStore::bundled();
    let names: Vec<&str> = store.list_documents().collect();
    assert_eq!(names, vec!["security", "style"]);
    assert_eq!(store.len(), 2);
}

#[test]
fn bundled_guides_load_without_diagnostics() {
    let store = DocumentStore::bundled();
    let messages: Vec<&str> = store.diagnostics().iter().map(|d| d.message.as_str()).collect();
    assert!(messages.is_empty(), "unexpected diagnostics: {:?}", messages);
}

#[test]
fn get_document_returns_requested_name() {
    let store = DocumentStore::bundled();
    for name in store.list_documents() {
        let doc = store.get_document(name).expect("listed document");
        assert_eq!(doc.name, name);
    }
}

#[test]
fn style_guide_has_heading_title_and_body() {
    let store = DocumentStore::bundled();
    let doc = store.get_document("style").unwrap();
    assert_eq!(doc.title, "C Style");
    assert!(!doc.is_empty());
    assert!(doc.summary.is_some());
    assert!(doc.code_fence_count() > 0);
    assert!(matches!(doc.body[0], Block::Heading { level: 1, .. }));
}

#[test]
fn unknown_name_is_not_found() {
    let store = DocumentStore::bundled();
    let err = store.get_document("does-not-exist").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "document not found: does-not-exist");
}

#[test]
fn lookup_is_exact_but_suggests_case_insensitive_match() {
    let store = DocumentStore::bundled();
    match store.get_document("Style") {
        Err(StoreError::NotFound { name, suggestion }) => {
            assert_eq!(name, "Style");
            assert_eq!(suggestion.as_deref(), Some("style"));
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn add_source_rejects_unaddressable_names() {
    let mut builder = DocumentStore::builder();
    let err = builder.add_source("Bad Name", "<test>", "# T\n").unwrap_err();
    assert!(matches!(err, StoreError::InvalidName(ref n) if n == "Bad Name"));
}

#[test]
fn source_with_parse_error_is_left_out_and_reported() {
    let mut builder = DocumentStore::builder();
    assert!(!builder.add_source("untitled", "<test>", "no heading here\n").unwrap());
    assert!(builder.add_source("ok", "<test>", "# Fine\n").unwrap());
    let store = builder.build();
    assert!(store.has_errors());
    assert!(store.get_document("untitled").unwrap_err().is_not_found());
    assert_eq!(store.get_document("ok").unwrap().title, "Fine");
}

#[test]
fn directory_guides_are_added_and_override_bundled() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("style.md"), "# Local Style\n\nmine\n").unwrap();
    fs::write(dir.path().join("extra.md"), "# Extra\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    fs::write(dir.path().join("Upper.md"), "# Skipped\n").unwrap();

    let mut builder = DocumentStore::builder();
    builder.add_bundled();
    let added = builder.add_dir(dir.path()).unwrap();
    let store = builder.build();

    assert_eq!(added, 2);
    let names: Vec<&str> = store.list_documents().collect();
    assert_eq!(names, vec!["extra", "security", "style"]);
    assert_eq!(store.get_document("style").unwrap().title, "Local Style");
}

#[test]
fn missing_directory_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = DocumentStore::builder().add_dir(&missing).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert!(err.to_string().starts_with("cannot read"));
}

#[test]
fn diagnostics_point_into_the_source_database() {
    use codespan_reporting::files::Files;

    let mut builder = DocumentStore::builder();
    builder
        .add_source("quoted", "quoted.md", "# Q\n\n> a quote\n")
        .unwrap();
    let store = builder.build();
    let warning = &store.diagnostics()[0];
    let source = store.files().source(warning.file_id).unwrap();
    assert!(source[warning.span.clone()].starts_with("> a quote"));
}

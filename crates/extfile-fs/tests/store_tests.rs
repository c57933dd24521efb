//! Tests for ExternalFileStore

use assert_fs::prelude::*;
use extfile_fs::{Error, ExternalFileStore, NormalizedPath, WriteMode};
use predicates::prelude::*;
use pretty_assertions::assert_eq;

fn store_in(temp: &assert_fs::TempDir) -> ExternalFileStore {
    ExternalFileStore::new(NormalizedPath::new(temp.path()))
}

const DIRTY: WriteMode = WriteMode {
    dirty: true,
    normalize_line_breaks: false,
};

const CLEAN: WriteMode = WriteMode {
    dirty: false,
    normalize_line_breaks: false,
};

#[test]
fn write_then_read_round_trips() {
    let temp = assert_fs::TempDir::new().unwrap();
    let store = store_in(&temp);
    let path = store.resolve("P/S/C/T-request.xml");

    let outcome = store.write(&path, "<soap:Envelope/>", DIRTY).unwrap();
    let read = store.read(&path).unwrap();

    assert!(outcome.written);
    assert_eq!(read.content, "<soap:Envelope/>");
    assert_eq!(read.modified, outcome.modified);
    temp.child("P/S/C/T-request.xml")
        .assert(predicate::str::contains("soap:Envelope"));
}

#[test]
fn read_missing_file_is_not_found() {
    let temp = assert_fs::TempDir::new().unwrap();
    let store = store_in(&temp);

    let err = store.read(&store.resolve("P/missing.groovy")).unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn clean_write_to_existing_file_is_skipped() {
    let temp = assert_fs::TempDir::new().unwrap();
    let store = store_in(&temp);
    let path = store.resolve("P/G.groovy");
    let first = store.write(&path, "println 1", DIRTY).unwrap();

    let second = store.write(&path, "println 2", CLEAN).unwrap();

    assert!(!second.written);
    assert_eq!(second.modified, first.modified);
    temp.child("P/G.groovy").assert("println 1");
}

#[test]
fn clean_write_to_missing_file_still_writes() {
    let temp = assert_fs::TempDir::new().unwrap();
    let store = store_in(&temp);
    let path = store.resolve("P/G.groovy");

    let outcome = store.write(&path, "println 1", CLEAN).unwrap();

    assert!(outcome.written);
    temp.child("P/G.groovy").assert("println 1");
}

#[cfg(not(windows))]
#[test]
fn line_break_normalization_forces_write() {
    let temp = assert_fs::TempDir::new().unwrap();
    let store = store_in(&temp);
    let path = store.resolve("P/G.groovy");
    store.write(&path, "a\r\nb", DIRTY).unwrap();

    let outcome = store
        .write(
            &path,
            "a\r\nb",
            WriteMode {
                dirty: false,
                normalize_line_breaks: true,
            },
        )
        .unwrap();

    assert!(outcome.written);
    temp.child("P/G.groovy").assert("a\nb");
}

#[test]
fn read_falls_back_to_decomposed_file_name() {
    let temp = assert_fs::TempDir::new().unwrap();
    // Stored decomposed: "e" + combining acute accent
    temp.child("P/cafe\u{301}.groovy").write_str("println 'nfd'").unwrap();
    let store = store_in(&temp);

    let read = store.read(&store.resolve("P/caf\u{e9}.groovy")).unwrap();

    assert_eq!(read.content, "println 'nfd'");
    assert!(read.path.as_str().ends_with("cafe\u{301}.groovy"));
}

#[test]
fn read_falls_back_to_composed_file_name() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("P/caf\u{e9}.groovy").write_str("println 'nfc'").unwrap();
    let store = store_in(&temp);

    let read = store.read(&store.resolve("P/cafe\u{301}.groovy")).unwrap();
    assert_eq!(read.content, "println 'nfc'");
}

#[test]
fn delete_prunes_empty_parents_but_keeps_populated_ancestors() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("P/S/C/T-request.xml").write_str("<soap/>").unwrap();
    temp.child("P/other.groovy").write_str("x").unwrap();
    let store = store_in(&temp);

    let deleted = store.delete(&store.resolve("P/S/C/T-request.xml")).unwrap();

    assert!(deleted);
    temp.child("P/S/C/T-request.xml").assert(predicate::path::missing());
    temp.child("P/S/C").assert(predicate::path::missing());
    temp.child("P/S").assert(predicate::path::missing());
    temp.child("P").assert(predicate::path::is_dir());
    temp.child("P/other.groovy").assert(predicate::path::exists());
}

#[test]
fn delete_never_removes_store_root() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("P/G.groovy").write_str("x").unwrap();
    let store = store_in(&temp);

    store.delete(&store.resolve("P/G.groovy")).unwrap();

    temp.child("P").assert(predicate::path::missing());
    temp.assert(predicate::path::is_dir());
}

#[test]
fn delete_missing_file_reports_false() {
    let temp = assert_fs::TempDir::new().unwrap();
    let store = store_in(&temp);
    assert!(!store.delete(&store.resolve("P/none.groovy")).unwrap());
}

#[test]
fn move_relocates_and_prunes_source_dirs() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("P/S/C/T-request.xml").write_str("<soap/>").unwrap();
    let store = store_in(&temp);

    store
        .move_file(
            &store.resolve("P/S/C/T-request.xml"),
            &store.resolve("P/S2/C/T-request.xml"),
        )
        .unwrap();

    temp.child("P/S2/C/T-request.xml").assert("<soap/>");
    temp.child("P/S").assert(predicate::path::missing());
}

#[test]
fn move_missing_source_is_not_found() {
    let temp = assert_fs::TempDir::new().unwrap();
    let store = store_in(&temp);

    let err = store
        .move_file(&store.resolve("a.groovy"), &store.resolve("b.groovy"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn modified_reports_disk_time() {
    let temp = assert_fs::TempDir::new().unwrap();
    let store = store_in(&temp);
    let path = store.resolve("G.groovy");
    assert!(store.modified(&path).is_none());

    let outcome = store.write(&path, "x", DIRTY).unwrap();
    assert_eq!(store.modified(&path), Some(outcome.modified));
}

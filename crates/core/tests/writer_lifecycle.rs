use std::path::Path;

use backrefs_api::{CompiledFileData, FileId};
use backrefs_core::storage::{FORMAT_VERSION, IndexRoot};
use backrefs_core::{IndexError, IndexWriter, SessionConfig, WriterMode};

fn enabled_rebuild(root: &Path) -> SessionConfig {
    SessionConfig::new(root).enabled(true).rebuild(true)
}

#[test]
fn disabled_session_removes_existing_index_and_ignores_writes() {
    let dir = tempfile::tempdir().unwrap();

    // Leave an index behind from an earlier enabled session.
    let writer = IndexWriter::initialize(&enabled_rebuild(dir.path())).unwrap();
    writer.close().unwrap();
    assert!(IndexRoot::exists(dir.path()));

    let cfg = SessionConfig::new(dir.path()).enabled(false);
    let writer = IndexWriter::initialize(&cfg).unwrap();
    assert_eq!(writer.mode(), WriterMode::Disabled);
    assert!(!IndexRoot::exists(dir.path()));

    // Writes are no-ops, not errors.
    writer.write_data(FileId(0), &CompiledFileData::new()).unwrap();
    writer.process_deleted_files(["src/A.java"]).unwrap();
    assert_eq!(writer.enumerate_path(Path::new("src/A.java")).unwrap(), None);
    writer.close().unwrap();
}

#[test]
fn wrong_compiler_discards_index_even_when_rebuild_is_requested() {
    let dir = tempfile::tempdir().unwrap();

    let writer = IndexWriter::initialize(&enabled_rebuild(dir.path())).unwrap();
    writer.close().unwrap();
    assert!(IndexRoot::exists(dir.path()));

    let cfg = SessionConfig::new(dir.path())
        .enabled(true)
        .compiler("ecj")
        .rebuild(true);
    let writer = IndexWriter::initialize(&cfg).unwrap();
    assert_eq!(writer.mode(), WriterMode::Disabled);
    assert!(!IndexRoot::exists(dir.path()));
}

#[test]
fn incremental_session_without_existing_index_stays_disabled() {
    let dir = tempfile::tempdir().unwrap();

    let cfg = SessionConfig::new(dir.path()).enabled(true);
    let writer = IndexWriter::initialize(&cfg).unwrap();
    assert_eq!(writer.mode(), WriterMode::Disabled);
    // It also must not create one as a side effect.
    assert!(!IndexRoot::exists(dir.path()));
}

#[test]
fn incremental_session_opens_existing_index() {
    let dir = tempfile::tempdir().unwrap();

    let writer = IndexWriter::initialize(&enabled_rebuild(dir.path())).unwrap();
    assert_eq!(writer.mode(), WriterMode::Rebuild);
    writer.close().unwrap();

    let cfg = SessionConfig::new(dir.path()).enabled(true);
    let writer = IndexWriter::initialize(&cfg).unwrap();
    assert_eq!(writer.mode(), WriterMode::Incremental);
    writer.close().unwrap();
}

#[test]
fn stale_version_stamp_fails_initialization() {
    let dir = tempfile::tempdir().unwrap();

    let index_dir = IndexRoot::index_dir(dir.path());
    std::fs::create_dir_all(&index_dir).unwrap();
    std::fs::write(index_dir.join("version"), "1").unwrap();

    let cfg = SessionConfig::new(dir.path()).enabled(true);
    let Err(err) = IndexWriter::initialize(&cfg) else {
        panic!("initialize should fail on a stale version stamp");
    };
    assert!(matches!(
        err,
        IndexError::VersionMismatch {
            found: 1,
            expected: FORMAT_VERSION
        }
    ));
    // The stale index is left for the orchestrator to deal with.
    assert!(IndexRoot::exists(dir.path()));
}

#[test]
fn failed_flush_still_transitions_to_closed() {
    let dir = tempfile::tempdir().unwrap();

    let writer = IndexWriter::initialize(&enabled_rebuild(dir.path())).unwrap();
    let file = writer
        .enumerate_path(Path::new("src/A.java"))
        .unwrap()
        .unwrap();
    let mut data = CompiledFileData::new();
    data.add_definition(backrefs_api::LightRef::Class {
        name: backrefs_api::NameId(0),
    });
    writer.write_data(file, &data).unwrap();

    // Pull the storage out from under the dirty tables.
    std::fs::remove_dir_all(IndexRoot::index_dir(dir.path())).unwrap();

    let Err(err) = writer.close() else {
        panic!("close should surface the flush failure");
    };
    assert!(matches!(err, IndexError::Corrupted(_)));

    // The handle is released regardless; closing again is a no-op and
    // writes are rejected.
    assert_eq!(writer.mode(), WriterMode::Closed);
    writer.close().unwrap();
    let Err(err) = writer.write_data(file, &data) else {
        panic!("write through a closed writer should be rejected");
    };
    assert!(matches!(err, IndexError::Contract(_)));
}

#[test]
fn rebuild_replaces_stale_version_without_error() {
    let dir = tempfile::tempdir().unwrap();

    let index_dir = IndexRoot::index_dir(dir.path());
    std::fs::create_dir_all(&index_dir).unwrap();
    std::fs::write(index_dir.join("version"), "1").unwrap();

    let writer = IndexWriter::initialize(&enabled_rebuild(dir.path())).unwrap();
    assert_eq!(writer.mode(), WriterMode::Rebuild);
    writer.close().unwrap();
    assert_eq!(
        IndexRoot::stored_version(dir.path()).unwrap(),
        Some(FORMAT_VERSION)
    );
}

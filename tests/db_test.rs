use partsxref::config::XrefConfig;
use partsxref::db::Database;
use partsxref::engine::XrefEngine;
use partsxref::errors::XrefError;
use partsxref::store::{RecordStore, SqliteRecordStore};
use partsxref::types::PartRecord;
use tempfile::TempDir;

/// Helper: create a temp database and return (Database, TempDir).
fn setup_db() -> (Database, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let db_path = dir.path().join("parts.db");
    let db = Database::initialize(&db_path).expect("failed to initialize database");
    (db, dir)
}

fn full_record(reference: &str, part: &str) -> PartRecord {
    PartRecord {
        reference_number: Some(reference.to_string()),
        make: Some("Acme".to_string()),
        part_number: Some(part.to_string()),
        company: Some("Acme Corp".to_string()),
        description: Some("filter".to_string()),
    }
}

#[test]
fn test_insert_and_read_back_in_order() {
    let (db, _dir) = setup_db();
    let records = vec![
        full_record("A1", "B2"),
        PartRecord {
            part_number: Some("ALPHA100".to_string()),
            ..PartRecord::default()
        },
        full_record("B2", "C3"),
    ];
    assert_eq!(db.insert_records(&records).unwrap(), 3);
    assert_eq!(db.count_records().unwrap(), 3);
    assert_eq!(db.get_all_records().unwrap(), records);
}

#[test]
fn test_lookup_by_identifier_normalizes_columns() {
    let (db, _dir) = setup_db();
    db.insert_records(&[
        full_record("X-9", "Y 9"),
        full_record("ab/12", "Q1"),
        full_record("Z1", "Z2"),
    ])
    .unwrap();

    let hits = db.get_records_by_identifier("x9", 500).unwrap();
    assert_eq!(hits, vec![full_record("X-9", "Y 9")]);

    let hits = db.get_records_by_identifier("AB-12", 500).unwrap();
    assert_eq!(hits.len(), 1);

    assert!(db.get_records_by_identifier("  ", 500).unwrap().is_empty());
    assert!(db.get_records_by_identifier("NOPE", 500).unwrap().is_empty());
}

#[test]
fn test_lookup_respects_limit() {
    let (db, _dir) = setup_db();
    let records: Vec<PartRecord> = (0..5).map(|i| full_record("HUB", &format!("S{i}"))).collect();
    db.insert_records(&records).unwrap();
    assert_eq!(db.get_records_by_identifier("hub", 2).unwrap().len(), 2);
}

#[test]
fn test_clear_removes_everything() {
    let (db, _dir) = setup_db();
    db.insert_records(&[full_record("A1", "B2")]).unwrap();
    db.clear().unwrap();
    assert_eq!(db.count_records().unwrap(), 0);
}

#[test]
fn test_initialize_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/parts.db");
    let db = Database::initialize(&path).unwrap();
    db.insert_records(&[full_record("A1", "B2")]).unwrap();
    drop(db);

    let reopened = Database::initialize(&path).unwrap();
    assert_eq!(reopened.count_records().unwrap(), 1);
    assert!(reopened.size().unwrap() > 0);
}

#[test]
fn test_open_missing_database_is_store_unavailable() {
    let dir = TempDir::new().unwrap();
    let result = Database::open(&dir.path().join("missing.db"));
    assert!(matches!(result, Err(XrefError::StoreUnavailable { .. })));
}

#[test]
fn test_sqlite_store_feeds_engine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("parts.db");
    let db = Database::initialize(&path).unwrap();
    db.insert_records(&[full_record("A1", "B2"), full_record("B2", "C3")])
        .unwrap();
    drop(db);

    let store = SqliteRecordStore::open(&path);
    assert_eq!(store.all_records().unwrap().len(), 2);
    assert_eq!(store.by_identifier("c3", 10).unwrap().len(), 1);

    let engine = XrefEngine::from_store(store, XrefConfig::default());
    engine.refresh().unwrap();
    let response = engine.search("A1", false).unwrap();
    assert_eq!(response.count, 2);
}

#[test]
fn test_in_memory_database_has_schema() {
    let db = Database::in_memory().unwrap();
    db.insert_records(&[full_record("A1", "B2")]).unwrap();
    let store = SqliteRecordStore::new(db);
    assert_eq!(store.all_records().unwrap().len(), 1);
}

#[test]
fn test_lookup_normalizes_stored_values_like_search() {
    let (db, _dir) = setup_db();
    let records = vec![
        PartRecord {
            part_number: Some("ab\t100".to_string()),
            ..PartRecord::default()
        },
        PartRecord {
            part_number: Some("é-1".to_string()),
            ..PartRecord::default()
        },
    ];
    db.insert_records(&records).unwrap();
    assert_eq!(db.get_records_by_identifier("AB100", 10).unwrap(), vec![records[0].clone()]);
    assert_eq!(db.get_records_by_identifier("É1", 10).unwrap(), vec![records[1].clone()]);

    let engine = XrefEngine::from_store(SqliteRecordStore::new(db), XrefConfig::default());
    engine.refresh().unwrap();
    for id in ["ab 100", "é/1"] {
        assert_eq!(engine.search(id, false).unwrap().count, 1, "{id}");
        assert_eq!(engine.lookup(id).unwrap().len(), 1, "{id}");
    }
}

#[test]
fn test_sqlite_store_connects_once_database_exists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("parts.db");
    let store = SqliteRecordStore::open(&path);
    assert!(matches!(
        store.all_records(),
        Err(XrefError::StoreUnavailable { .. })
    ));

    let db = Database::initialize(&path).unwrap();
    db.insert_records(&[full_record("A1", "B2")]).unwrap();
    drop(db);

    assert_eq!(store.all_records().unwrap().len(), 1);
    assert_eq!(store.by_identifier("b-2", 10).unwrap().len(), 1);
}

#[test]
fn test_corrupt_database_reports_real_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("parts.db");
    std::fs::write(&path, "not a sqlite file\n".repeat(256)).unwrap();

    let err = SqliteRecordStore::open(&path).all_records().unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, XrefError::StoreUnavailable { .. }));
    assert!(message.contains("not a database"), "{message}");
    assert!(!message.contains("no database found"), "{message}");
}

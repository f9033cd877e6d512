//! Batch import against real on-disk persistence.

use chrono::{NaiveDate, TimeZone, Utc};
use renewal_reminder::{
    import::{import_template, Cell},
    storage::{JsonFilePersistence, Persistence, SqlitePersistence},
    ExpiryMode, RecordInput, RecordStore, RenewalError,
};

fn header() -> Vec<Cell> {
    import_template().remove(0)
}

fn row(payer: &str, company: &str, years: &str, date: &str, email: &str) -> Vec<Cell> {
    vec![
        payer.into(),
        company.into(),
        years.into(),
        date.into(),
        email.into(),
    ]
}

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
}

#[test]
fn one_bad_email_among_three_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    let mut store = RecordStore::open(JsonFilePersistence::new(&path)).unwrap();

    let existing = store
        .create_record(
            &RecordInput {
                payer: "Existing".into(),
                company: "Old Co".into(),
                years: "1".into(),
                date: "2024-05-01".into(),
                email: "old@example.com".into(),
            },
            ExpiryMode::InitialPurchase,
            now(),
        )
        .unwrap();

    let rows = vec![
        header(),
        row("Alice", "Acme", "1", "2025-01-01", "alice@acme.io"),
        row("Bob", "Beta", "2", "2025-01-15", "bob-at-beta"),
        row("Carol", "Gamma", "3", "2025-02-01", "carol@gamma.org"),
    ];

    let outcome = store.import_batch(&rows, now()).unwrap();

    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].row, 3);
    assert!(outcome.failures[0].to_string().starts_with("Row 3: invalid email format"));

    assert_eq!(store.len(), 3);
    let ids: Vec<i64> = store.records().iter().map(|r| r.id).collect();
    assert_ne!(ids[1], ids[2]);
    assert!(!outcome.imported_ids.contains(&existing.id));

    let alice = store.find(outcome.imported_ids[0]).unwrap();
    assert_eq!(alice.expiry_date, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    let carol = store.find(outcome.imported_ids[1]).unwrap();
    assert_eq!(carol.expiry_date, NaiveDate::from_ymd_opt(2028, 2, 1).unwrap());

    // Everything reached disk.
    let reloaded = JsonFilePersistence::new(&path).load().unwrap();
    assert_eq!(reloaded.as_slice(), store.records());
}

#[test]
fn repeated_imports_in_the_same_instant_never_collide() {
    let mut store = RecordStore::open(SqlitePersistence::in_memory().unwrap()).unwrap();
    let rows = vec![
        header(),
        row("Alice", "Acme", "1", "2025-01-01", "alice@acme.io"),
        row("Bob", "Beta", "1", "2025-01-02", "bob@beta.io"),
    ];

    let first = store.import_batch(&rows, now()).unwrap();
    let second = store.import_batch(&rows, now()).unwrap();

    let mut ids: Vec<i64> = first
        .imported_ids
        .iter()
        .chain(second.imported_ids.iter())
        .copied()
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 4);
    assert_eq!(store.len(), 4);
}

#[test]
fn blank_rows_are_skipped_and_failures_keep_exact_counts() {
    let mut store = RecordStore::open(SqlitePersistence::in_memory().unwrap()).unwrap();

    let mut rows = vec![header()];
    rows.push(vec![]);
    rows.push(vec![Cell::Empty, "Orphan".into()]);
    for i in 0..8 {
        rows.push(row(&format!("P{i}"), "Co", "0", "2025-01-01", "p@co.io"));
    }
    rows.push(row("Good", "Co", "1", "2025-01-01", "good@co.io"));

    let outcome = store.import_batch(&rows, now()).unwrap();

    assert_eq!(outcome.skipped, 2);
    assert_eq!(outcome.failed, 8);
    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.displayed_failures().len(), 5);
    assert_eq!(outcome.hidden_failures(), 3);
    assert_eq!(outcome.failures[0].row, 4);
    assert!(outcome.summary().contains("...and 3 more errors"));
    assert_eq!(store.len(), 1);
}

#[test]
fn spreadsheet_typed_cells_are_accepted() {
    let mut store = RecordStore::open(SqlitePersistence::in_memory().unwrap()).unwrap();
    let rows: Vec<Vec<Cell>> = serde_json::from_str(
        r#"[
            ["Payer", "Company", "Years", "Purchase date", "Contact email"],
            ["Dana", "Delta", 2, 45658, "dana@delta.io"]
        ]"#,
    )
    .unwrap();

    let outcome = store.import_batch(&rows, now()).unwrap();
    assert_eq!(outcome.succeeded, 1);
    assert_eq!(
        store.records()[0].expiry_date,
        NaiveDate::from_ymd_opt(2027, 1, 1).unwrap()
    );
}

#[test]
fn header_only_input_is_rejected() {
    let mut store = RecordStore::open(SqlitePersistence::in_memory().unwrap()).unwrap();
    assert!(matches!(
        store.import_batch(&[header()], now()),
        Err(RenewalError::NoRows)
    ));
    assert!(matches!(
        store.import_batch(&[], now()),
        Err(RenewalError::NoRows)
    ));
}

#[test]
fn all_rows_failing_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    let mut store = RecordStore::open(JsonFilePersistence::new(&path)).unwrap();

    let rows = vec![header(), row("Alice", "Acme", "1", "someday", "alice@acme.io")];
    let outcome = store.import_batch(&rows, now()).unwrap();

    assert_eq!(outcome.succeeded, 0);
    assert_eq!(outcome.failed, 1);
    assert!(!path.exists());
}

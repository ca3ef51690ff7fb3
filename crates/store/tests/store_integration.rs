//! 통합 테스트 -- 파일 기반 저장소에서 윈도우 커서 동작 검증

use chrono::{NaiveDate, NaiveDateTime};

use urnlog_core::error::StoreError;
use urnlog_core::pipeline::{EventStore, QueryEngine};
use urnlog_core::types::{EventDraft, GapFrequency, PartitionRow, Region, Round, TargetTable};
use urnlog_store::SqliteStore;

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 10, 2)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .expect("valid time")
}

fn event(file: &str, ts: NaiveDateTime, category: &str) -> EventDraft {
    EventDraft::new(
        ts,
        "INFO",
        "00407",
        category,
        if category == "VOTA" {
            "O voto do eleitor foi computado"
        } else {
            "Outro evento"
        },
        Some("0123456789ABCDEF".to_owned()),
        file,
    )
}

fn vote(file: &str, ts: NaiveDateTime) -> EventDraft {
    event(file, ts, "VOTA")
}

fn target() -> TargetTable {
    TargetTable::new(Region::Mg, Round::First)
}

fn chains(store: &SqliteStore, max_gap: u32) -> Vec<PartitionRow> {
    let mut rows = Vec::new();
    store
        .scan_vote_chains(&target(), max_gap, |row| {
            rows.push(row);
            Ok::<_, StoreError>(())
        })
        .expect("scan chains");
    rows
}

fn frequencies(store: &SqliteStore) -> Vec<(Option<i64>, u64)> {
    let mut buckets = Vec::new();
    store
        .scan_gap_frequencies(&target(), |GapFrequency { gap_seconds, count }| {
            buckets.push((gap_seconds, count));
            Ok::<_, StoreError>(())
        })
        .expect("scan frequencies");
    buckets
}

fn loaded_store(drafts: &[EventDraft]) -> SqliteStore {
    let mut store = SqliteStore::in_memory().expect("open store");
    store.recreate(&target()).expect("recreate");
    store.insert_batch(&target(), drafts).expect("insert");
    store
}

#[test]
fn chain_cursor_reports_run_with_break_markers() {
    let store = loaded_store(&[
        vote("a.logjez", at(10, 0, 0)),
        vote("a.logjez", at(10, 0, 2)),
        event("a.logjez", at(10, 0, 3), "GAP"),
        vote("a.logjez", at(10, 0, 4)),
        vote("a.logjez", at(10, 0, 9)),
        vote("a.logjez", at(10, 1, 0)),
    ]);

    let rows = chains(&store, 5);
    let summary: Vec<_> = rows
        .iter()
        .map(|r| (r.id, r.previous_id, r.gap_seconds))
        .collect();

    // 비투표 행(id 3)은 제외, 10:01:00은 간격 51초라 선택되지 않음
    assert_eq!(
        summary,
        vec![
            (1, None, None),
            (2, Some(1), Some(2)),
            (4, Some(2), Some(2)),
            (5, Some(4), Some(5)),
        ]
    );
}

#[test]
fn chain_cursor_marks_restart_after_long_gap() {
    let store = loaded_store(&[
        vote("a", at(9, 0, 0)),
        vote("a", at(9, 0, 1)),
        vote("a", at(9, 5, 0)),
        vote("a", at(9, 5, 3)),
    ]);

    let rows = chains(&store, 5);
    let summary: Vec<_> = rows
        .iter()
        .map(|r| (r.id, r.previous_id, r.gap_seconds))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, None, None),
            (2, Some(1), Some(1)),
            (3, None, None),
            (4, Some(3), Some(3)),
        ]
    );
}

#[test]
fn partitions_do_not_chain_across_files() {
    let store = loaded_store(&[
        vote("b", at(10, 0, 1)),
        vote("a", at(10, 0, 0)),
        vote("a", at(10, 0, 2)),
        vote("b", at(10, 0, 3)),
    ]);

    let rows = chains(&store, 5);
    let files: Vec<_> = rows
        .iter()
        .map(|r| (r.source_file.as_str(), r.previous_id))
        .collect();
    assert_eq!(
        files,
        vec![("a", None), ("a", Some(2)), ("b", None), ("b", Some(1))]
    );
}

#[test]
fn frequency_cursor_groups_gaps_ascending() {
    let store = loaded_store(&[
        vote("a", at(10, 0, 0)),
        vote("a", at(10, 0, 2)),
        vote("a", at(10, 0, 4)),
        vote("a", at(10, 0, 9)),
        vote("a", at(10, 1, 0)),
        event("a", at(10, 1, 1), "GAP"),
    ]);

    assert_eq!(
        frequencies(&store),
        vec![(None, 1), (Some(2), 2), (Some(5), 1), (Some(51), 1)]
    );
}

#[test]
fn reprocessing_on_disk_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("db/urnlog.sqlite3");
    let drafts = vec![
        vote("a", at(10, 0, 0)),
        event("a", at(10, 0, 1), "GAP"),
        vote("b", at(10, 0, 2)),
    ];

    let run = |drafts: &[EventDraft]| {
        let mut store = SqliteStore::open(&path).expect("open");
        store.recreate(&target()).expect("recreate");
        store.insert_batch(&target(), drafts).expect("insert");
        store.fetch_events(&target()).expect("fetch")
    };

    let first = run(&drafts);
    let second = run(&drafts);
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
    assert!(path.exists());
}

#[test]
fn tables_are_isolated_per_region_and_round() {
    let mut store = SqliteStore::in_memory().expect("open");
    let other = TargetTable::new(Region::Mg, Round::Second);

    store.recreate(&target()).expect("recreate");
    store.recreate(&other).expect("recreate other");
    store
        .insert_batch(&target(), &[vote("a", at(10, 0, 0))])
        .expect("insert");
    store.recreate(&other).expect("recreate other again");

    assert_eq!(store.count_rows(&target()).expect("count"), 1);
    assert_eq!(store.count_rows(&other).expect("count"), 0);
}

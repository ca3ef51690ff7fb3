//! 통합 테스트 -- SQLite 커서에서 CSV 보고서까지

use chrono::{NaiveDate, NaiveDateTime};

use urnlog_analysis::{AnalysisError, SequenceParams, run_frequencies, run_sequences};
use urnlog_core::pipeline::EventStore;
use urnlog_core::types::{EventDraft, Region, Round, TargetTable};
use urnlog_store::SqliteStore;

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2022, 10, 2)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .expect("valid time")
}

fn vote(file: &str, ts: NaiveDateTime) -> EventDraft {
    EventDraft::new(
        ts,
        "INFO",
        "00407",
        "VOTA",
        "O voto do eleitor foi computado",
        None,
        file,
    )
}

fn target() -> TargetTable {
    TargetTable::new(Region::Sp, Round::First)
}

fn store_with(drafts: &[EventDraft]) -> SqliteStore {
    let mut store = SqliteStore::in_memory().expect("open store");
    store.recreate(&target()).expect("recreate");
    store.insert_batch(&target(), drafts).expect("insert");
    store
}

fn sample_partition() -> Vec<EventDraft> {
    vec![
        vote("a.logjez", at(10, 0, 0)),
        vote("a.logjez", at(10, 0, 2)),
        vote("a.logjez", at(10, 0, 4)),
        vote("a.logjez", at(10, 0, 9)),
        vote("a.logjez", at(10, 1, 0)),
    ]
}

#[test]
fn sequence_report_matches_expected_rows() {
    let store = store_with(&sample_partition());
    let dir = tempfile::tempdir().expect("tempdir");

    let outcome = run_sequences(
        &store,
        target(),
        SequenceParams::new(5, 2).expect("params"),
        &dir.path().join("sequencias"),
    )
    .expect("run sequences");

    assert_eq!(outcome.report.sequences, 1);
    assert_eq!(outcome.report.rows_read, 4);
    assert_eq!(outcome.report.rows_written, 4);
    assert!(outcome.path.ends_with("sequencias/SP-1t-5s-2q.csv"));

    let content = std::fs::read_to_string(&outcome.path).expect("read report");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "uf;id;arquivo;data_hora;segundos_depois",
            "SP;1;a.logjez;2022-10-02 10:00:00;-1",
            "SP;2;a.logjez;2022-10-02 10:00:02;2",
            "SP;3;a.logjez;2022-10-02 10:00:04;2",
            "SP;4;a.logjez;2022-10-02 10:00:09;5",
        ]
    );
}

#[test]
fn high_minimum_yields_header_only() {
    let store = store_with(&sample_partition());
    let dir = tempfile::tempdir().expect("tempdir");

    let outcome = run_sequences(
        &store,
        target(),
        SequenceParams::new(5, 5).expect("params"),
        dir.path(),
    )
    .expect("run sequences");

    assert_eq!(outcome.report.sequences, 0);
    let content = std::fs::read_to_string(&outcome.path).expect("read report");
    assert_eq!(content.lines().count(), 1);
}

#[test]
fn frequency_report_matches_expected_buckets() {
    let store = store_with(&sample_partition());
    let dir = tempfile::tempdir().expect("tempdir");

    let outcome = run_frequencies(&store, target(), &dir.path().join("frequencias"))
        .expect("run frequencies");

    assert_eq!(outcome.report.buckets, 4);
    assert_eq!(outcome.report.events, 5);
    let content = std::fs::read_to_string(&outcome.path).expect("read report");
    assert_eq!(
        content.lines().collect::<Vec<_>>(),
        vec![
            "uf;segundos_depois;frequencia",
            "SP;-1;1",
            "SP;2;2",
            "SP;5;1",
            "SP;51;1",
        ]
    );
}

#[test]
fn failed_query_leaves_no_report_behind() {
    let store = SqliteStore::in_memory().expect("open store");
    let dir = tempfile::tempdir().expect("tempdir");

    let err = run_frequencies(&store, target(), dir.path()).unwrap_err();
    assert!(matches!(err, AnalysisError::Store(_)));
    assert!(!dir.path().join("SP-1t.csv").exists());

    let err = run_sequences(
        &store,
        target(),
        SequenceParams::new(5, 5).expect("params"),
        dir.path(),
    )
    .unwrap_err();
    assert!(matches!(err, AnalysisError::Store(_)));
    assert!(!dir.path().join("SP-1t-5s-5q.csv").exists());
}

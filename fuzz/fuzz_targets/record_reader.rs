#![no_main]

use std::io::Cursor;
use std::path::PathBuf;

use arbitrary::Arbitrary;
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use urnlog_ingest::{MemoryDiagnostics, RecordParser};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    /// 결선 투표일 기준 여부
    second_round: bool,
    /// 로그 파일 내용 (줄바꿈 포함)
    content: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let date = if input.second_round {
        NaiveDate::from_ymd_opt(2022, 10, 30)
    } else {
        NaiveDate::from_ymd_opt(2022, 10, 2)
    };
    let Some(date) = date else { return };

    let parser = RecordParser::new(date);
    let mut reader = parser.read(
        Cursor::new(input.content),
        PathBuf::from("fuzz/logd.dat"),
        "fuzz.logjez".to_owned(),
        MemoryDiagnostics::new(),
    );

    // 적재되는 라인은 모두 회차 날짜여야 한다
    for draft in reader.by_ref() {
        assert_eq!(draft.timestamp.date(), date);
    }

    let stats = reader.stats();
    assert!(stats.accepted + stats.rejected + stats.filtered <= stats.lines);
    let diagnostics = reader.into_diagnostics();
    assert_eq!(diagnostics.failures.len() as u64, stats.rejected);
});

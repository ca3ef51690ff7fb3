//! 로그 라인 파서 벤치마크
//!
//! 투표 확인 라인, 해시 없는 라인, 라틴 문자 라인의 파싱 처리량과
//! 파일 하나 분량의 레코드 리더 처리량을 측정합니다.

use std::io::Cursor;
use std::path::PathBuf;

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use urnlog_ingest::diagnostics::MemoryDiagnostics;
use urnlog_ingest::parser::{RecordParser, parse_line};

/// 투표 확인 라인 (해시 포함)
const VOTE_LINE: &[u8] =
    b"02/10/2022 08:00:01\tINFO\t00407\tVOTA\tO voto do eleitor foi computado\t9F3A0C11D2E4B5A6";

/// 해시 없는 짧은 라인
const SHORT_LINE: &[u8] = b"02/10/2022 07:30:00\tINFO\t00407\tGAP\tIniciando aplicacao";

/// ISO-8859-15 라틴 문자가 섞인 긴 라인
const LATIN_LINE: &[u8] = b"02/10/2022 17:00:05\tALERTA\t00407\tSCUE\tAplica\xE7\xE3o de vota\xE7\xE3o encerrada; identifica\xE7\xE3o biom\xE9trica n\xE3o conferida ap\xF3s tr\xEAs tentativas\tC0FFEE00DEADBEEF";

fn bench_parse_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_line");
    group.throughput(Throughput::Elements(1));

    for (name, line) in [("vote", VOTE_LINE), ("short", SHORT_LINE), ("latin", LATIN_LINE)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &line, |b, line| {
            b.iter(|| parse_line(black_box(*line), "o00407.logjez").unwrap())
        });
    }

    group.finish();
}

fn bench_record_reader(c: &mut Criterion) {
    let mut file = Vec::new();
    for i in 0..1000 {
        let line = if i % 3 == 0 { SHORT_LINE } else { VOTE_LINE };
        file.extend_from_slice(line);
        file.extend_from_slice(b"\r\n");
    }

    let parser = RecordParser::new(NaiveDate::from_ymd_opt(2022, 10, 2).unwrap());

    let mut group = c.benchmark_group("record_reader");
    group.throughput(Throughput::Elements(1000));
    group.bench_function("file_1000_lines", |b| {
        b.iter(|| {
            let reader = parser.read(
                Cursor::new(black_box(file.as_slice())),
                PathBuf::from("logd.dat"),
                "o00407.logjez".to_owned(),
                MemoryDiagnostics::new(),
            );
            reader.count()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_parse_line, bench_record_reader);
criterion_main!(benches);

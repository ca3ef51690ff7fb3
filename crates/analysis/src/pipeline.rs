//! 분석 실행 오케스트레이션
//!
//! 보고서 파일을 만든 뒤 쿼리 엔진 커서를 분석기에 밀어 넣고, 끝나면 파일을 확정합니다.
//! 중간에 실패하면 보고서 파일은 drop되면서 삭제됩니다.

use std::path::{Path, PathBuf};

use tracing::info;
use urnlog_core::pipeline::QueryEngine;
use urnlog_core::types::TargetTable;

use crate::error::AnalysisError;
use crate::frequency::{FrequencyAggregator, FrequencyReport};
use crate::report::{FrequencyCsv, SequenceCsv, frequency_report_path, sequence_report_path};
use crate::sequence::{SequenceDetector, SequenceParams, SequenceReport};

/// 연쇄 분석 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceOutcome {
    /// 기록된 보고서 경로
    pub path: PathBuf,
    pub report: SequenceReport,
}

/// 빈도 분석 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyOutcome {
    /// 기록된 보고서 경로
    pub path: PathBuf,
    pub report: FrequencyReport,
}

/// 연쇄를 탐지해 `{output_dir}/{UF}-{n}t-{T}s-{Q}q.csv`에 기록합니다.
pub fn run_sequences<Q: QueryEngine>(
    engine: &Q,
    target: TargetTable,
    params: SequenceParams,
    output_dir: &Path,
) -> Result<SequenceOutcome, AnalysisError> {
    let path = sequence_report_path(output_dir, &target, &params);
    let csv = SequenceCsv::create(&path, target.region)?;
    let mut detector = SequenceDetector::new(params, csv);

    info!(
        table = %target,
        max_gap_secs = params.max_gap_secs,
        min_gaps = params.min_gaps,
        "sequence query started"
    );
    engine.scan_vote_chains(&target, params.max_gap_secs, |row| detector.push(row))?;

    let (report, csv) = detector.finish()?;
    let path = csv.commit()?;
    info!(path = %path.display(), sequences = report.sequences, "sequence report written");

    Ok(SequenceOutcome { path, report })
}

/// 간격 빈도를 집계해 `{output_dir}/{UF}-{n}t.csv`에 기록합니다.
pub fn run_frequencies<Q: QueryEngine>(
    engine: &Q,
    target: TargetTable,
    output_dir: &Path,
) -> Result<FrequencyOutcome, AnalysisError> {
    let path = frequency_report_path(output_dir, &target);
    let csv = FrequencyCsv::create(&path, target.region)?;
    let mut aggregator = FrequencyAggregator::new(csv);

    info!(table = %target, "frequency query started");
    engine.scan_gap_frequencies(&target, |row| aggregator.push(row))?;

    let (report, csv) = aggregator.finish();
    let path = csv.commit()?;
    info!(path = %path.display(), buckets = report.buckets, "frequency report written");

    Ok(FrequencyOutcome { path, report })
}

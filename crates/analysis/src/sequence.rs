//! 투표 연쇄 탐지기
//!
//! 쿼리 엔진의 연쇄 커서를 한 번만 훑으며, 같은 원본 파일 안에서
//! `previous_id`로 이어지는 행들을 하나의 연쇄로 묶습니다.
//! 간격이 임계값을 넘는 행은 쿼리 엔진이 이미 끊어서 보내므로
//! 탐지기는 `previous_id`가 직전 행의 id와 같은지만 봅니다.
//!
//! 연쇄의 첫 행은 시작점 표시일 뿐이므로 간격 수는 `행 수 - 1`이며,
//! 간격 수가 `min_gaps` 이상일 때만 기록합니다.
//!
//! # 사용 예시
//! ```ignore
//! use urnlog_analysis::sequence::{SequenceDetector, SequenceParams};
//!
//! let params = SequenceParams::new(5, 2)?;
//! let mut detector = SequenceDetector::new(params, Vec::new());
//! for row in rows {
//!     detector.push(row)?;
//! }
//! let (report, written) = detector.finish()?;
//! ```

use chrono::NaiveDateTime;
use metrics::counter;
use tracing::{debug, info};
use urnlog_core::metrics as names;
use urnlog_core::types::PartitionRow;

use crate::error::AnalysisError;

/// 진행 상황 로그 간격 (행)
pub const PROGRESS_EVERY_ROWS: u64 = 1000;

/// 최소 간격 수 기본값
pub const DEFAULT_MIN_GAPS: u32 = 5;

/// 연쇄의 첫 행에 기록되는 간격 값
pub const RUN_START_GAP: i64 = -1;

/// 연쇄 탐지 매개변수
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceParams {
    /// 연쇄로 인정하는 최대 간격 (초, `T`)
    pub max_gap_secs: u32,
    /// 기록에 필요한 최소 간격 수 (`Q`)
    pub min_gaps: u32,
}

impl SequenceParams {
    /// 두 값 모두 1 이상이어야 합니다.
    pub fn new(max_gap_secs: u32, min_gaps: u32) -> Result<Self, AnalysisError> {
        if max_gap_secs == 0 {
            return Err(AnalysisError::InvalidParameter {
                name: "max_gap_secs".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        if min_gaps == 0 {
            return Err(AnalysisError::InvalidParameter {
                name: "min_gaps".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(Self {
            max_gap_secs,
            min_gaps,
        })
    }
}

/// 보고서에 기록되는 연쇄 구성 행
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRow {
    pub id: i64,
    pub source_file: String,
    pub timestamp: NaiveDateTime,
    /// 직전 행 이후 경과 초. 연쇄 첫 행은 `-1`
    pub gap_seconds: i64,
}

/// 연쇄 행 기록 대상
pub trait SequenceSink {
    fn write_row(&mut self, row: &SequenceRow) -> Result<(), AnalysisError>;
}

impl SequenceSink for Vec<SequenceRow> {
    fn write_row(&mut self, row: &SequenceRow) -> Result<(), AnalysisError> {
        self.push(row.clone());
        Ok(())
    }
}

impl<T: SequenceSink + ?Sized> SequenceSink for &mut T {
    fn write_row(&mut self, row: &SequenceRow) -> Result<(), AnalysisError> {
        (**self).write_row(row)
    }
}

/// 연쇄 탐지 결과 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceReport {
    /// 커서에서 읽은 행 수
    pub rows_read: u64,
    /// 기록된 연쇄 수
    pub sequences: u64,
    /// 기록된 행 수
    pub rows_written: u64,
}

/// 밀어 넣기 방식의 연쇄 탐지 상태 기계
///
/// 메모리 사용량은 현재 연쇄 길이에만 비례합니다.
pub struct SequenceDetector<W> {
    params: SequenceParams,
    sink: W,
    run: Vec<PartitionRow>,
    report: SequenceReport,
}

impl<W: SequenceSink> SequenceDetector<W> {
    pub fn new(params: SequenceParams, sink: W) -> Self {
        Self {
            params,
            sink,
            run: Vec::new(),
            report: SequenceReport::default(),
        }
    }

    /// 커서 행 하나를 처리합니다.
    ///
    /// 행은 `(source_file, timestamp)` 순서로 들어와야 합니다.
    pub fn push(&mut self, row: PartitionRow) -> Result<(), AnalysisError> {
        self.report.rows_read += 1;
        counter!(names::ANALYSIS_ROWS_READ_TOTAL, names::LABEL_MODE => "sequences").increment(1);
        if self.report.rows_read % PROGRESS_EVERY_ROWS == 0 {
            info!(rows = self.report.rows_read, "sequence analysis progress");
        }

        let chained = self
            .run
            .last()
            .is_none_or(|last| row.previous_id == Some(last.id));
        if !chained {
            self.close_run()?;
        }

        self.run.push(row);
        Ok(())
    }

    /// 마지막 연쇄를 평가하고 요약과 싱크를 돌려줍니다.
    pub fn finish(mut self) -> Result<(SequenceReport, W), AnalysisError> {
        self.close_run()?;
        info!(
            rows_read = self.report.rows_read,
            sequences = self.report.sequences,
            rows_written = self.report.rows_written,
            "sequence analysis finished"
        );
        Ok((self.report, self.sink))
    }

    fn close_run(&mut self) -> Result<(), AnalysisError> {
        if self.run.is_empty() {
            return Ok(());
        }

        let gaps = self.run.len() - 1;
        if gaps >= self.params.min_gaps as usize {
            for (index, member) in self.run.iter().enumerate() {
                let gap_seconds = if index == 0 {
                    RUN_START_GAP
                } else {
                    member.gap_seconds.unwrap_or(RUN_START_GAP)
                };
                self.sink.write_row(&SequenceRow {
                    id: member.id,
                    source_file: member.source_file.clone(),
                    timestamp: member.timestamp,
                    gap_seconds,
                })?;
            }

            self.report.sequences += 1;
            self.report.rows_written += self.run.len() as u64;
            counter!(names::ANALYSIS_SEQUENCES_FOUND_TOTAL).increment(1);
            debug!(
                source_file = %self.run[0].source_file,
                first_id = self.run[0].id,
                length = self.run.len(),
                "sequence recorded"
            );
        }

        self.run.clear();
        Ok(())
    }
}

//! 간격 빈도 집계기
//!
//! 쿼리 엔진이 간격 값별로 묶어 오름차순으로 보내는 행을 그대로 기록합니다.
//! 간격이 없는 행(파티션 첫 투표)은 `-1`로 바꿉니다.

use metrics::counter;
use tracing::info;
use urnlog_core::metrics as names;
use urnlog_core::types::GapFrequency;

use crate::error::AnalysisError;
use crate::sequence::{PROGRESS_EVERY_ROWS, RUN_START_GAP};

/// 보고서에 기록되는 빈도 행
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyBucket {
    /// 직전 투표 이후 경과 초. 파티션 첫 투표는 `-1`
    pub gap_seconds: i64,
    pub count: u64,
}

impl From<GapFrequency> for FrequencyBucket {
    fn from(row: GapFrequency) -> Self {
        Self {
            gap_seconds: row.gap_seconds.unwrap_or(RUN_START_GAP),
            count: row.count,
        }
    }
}

/// 빈도 행 기록 대상
pub trait FrequencySink {
    fn write_bucket(&mut self, bucket: &FrequencyBucket) -> Result<(), AnalysisError>;
}

impl FrequencySink for Vec<FrequencyBucket> {
    fn write_bucket(&mut self, bucket: &FrequencyBucket) -> Result<(), AnalysisError> {
        self.push(*bucket);
        Ok(())
    }
}

impl<T: FrequencySink + ?Sized> FrequencySink for &mut T {
    fn write_bucket(&mut self, bucket: &FrequencyBucket) -> Result<(), AnalysisError> {
        (**self).write_bucket(bucket)
    }
}

/// 빈도 집계 결과 요약
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrequencyReport {
    /// 기록된 간격 값 수
    pub buckets: u64,
    /// 전체 투표 확인 이벤트 수 (빈도 합계)
    pub events: u64,
}

/// 빈도 집계기
pub struct FrequencyAggregator<W> {
    sink: W,
    report: FrequencyReport,
}

impl<W: FrequencySink> FrequencyAggregator<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            report: FrequencyReport::default(),
        }
    }

    /// 커서 행 하나를 기록합니다.
    pub fn push(&mut self, row: GapFrequency) -> Result<(), AnalysisError> {
        let bucket = FrequencyBucket::from(row);
        self.sink.write_bucket(&bucket)?;

        self.report.buckets += 1;
        self.report.events += bucket.count;
        counter!(names::ANALYSIS_ROWS_READ_TOTAL, names::LABEL_MODE => "frequencies").increment(1);
        if self.report.buckets % PROGRESS_EVERY_ROWS == 0 {
            info!(rows = self.report.buckets, "frequency analysis progress");
        }
        Ok(())
    }

    pub fn finish(self) -> (FrequencyReport, W) {
        info!(
            buckets = self.report.buckets,
            events = self.report.events,
            "frequency analysis finished"
        );
        (self.report, self.sink)
    }
}

#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`sequence`]: 투표 연쇄 탐지 상태 기계
//! - [`frequency`]: 간격 빈도 집계
//! - [`report`]: `;` 구분 CSV 보고서 (실패 시 삭제)
//! - [`pipeline`]: 분석 실행 오케스트레이션 (`QueryEngine` 사용)
//! - [`error`]: 도메인 에러 타입

pub mod error;
pub mod frequency;
pub mod pipeline;
pub mod report;
pub mod sequence;

// --- 주요 타입 re-export ---

pub use error::AnalysisError;
pub use frequency::{FrequencyAggregator, FrequencyBucket, FrequencyReport, FrequencySink};
pub use pipeline::{FrequencyOutcome, SequenceOutcome, run_frequencies, run_sequences};
pub use report::{FrequencyCsv, SequenceCsv};
pub use sequence::{
    DEFAULT_MIN_GAPS, SequenceDetector, SequenceParams, SequenceReport, SequenceRow, SequenceSink,
};

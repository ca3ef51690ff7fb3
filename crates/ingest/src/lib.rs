#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`archive`]: 중첩 컨테이너(zip, 7z) 워커와 임시 추출 디렉토리
//! - [`parser`]: ISO-8859-15 탭 구분 로그 라인 파서, 회차 날짜 필터
//! - [`diagnostics`]: 버려진 라인의 진단 싱크
//! - [`loader`]: 배치 적재기 (`EventStore` 사용)
//! - [`pipeline`]: 전체 수집 실행 오케스트레이션
//! - [`config`]: 수집 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입

pub mod archive;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod loader;
pub mod parser;
pub mod pipeline;

// --- 주요 타입 re-export ---

// 아카이브
pub use archive::{ArchiveWalker, EntryKind, LeafLog, WalkStats};

// 파서
pub use parser::{LineError, ReadStats, RecordParser, RecordReader, parse_line};

// 진단
pub use diagnostics::{DiagnosticsSink, LineFailure, MemoryDiagnostics, TracingDiagnostics};

// 적재
pub use loader::Loader;
pub use pipeline::{LoadReport, run_ingest};

// 설정
pub use config::IngestConfig;

// 에러
pub use error::IngestError;

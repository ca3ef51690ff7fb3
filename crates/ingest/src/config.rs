//! 수집 단계 설정
//!
//! [`IngestConfig`]는 core의 [`UrnlogConfig`]와 요청된 회차로부터
//! 수집/적재 단계 전용 설정을 만듭니다.
//!
//! # 사용 예시
//! ```ignore
//! use urnlog_core::{Round, UrnlogConfig};
//! use urnlog_ingest::config::IngestConfig;
//!
//! let core_config = UrnlogConfig::default();
//! let config = IngestConfig::from_core(&core_config, Round::First);
//! ```

use chrono::NaiveDate;
use urnlog_core::config::UrnlogConfig;
use urnlog_core::types::Round;

use crate::error::IngestError;

/// 분석에 쓰이지 않는 투표기 산출물 확장자 (투표 보고서, 이미지, 서명 등)
pub const DEFAULT_IGNORED_EXTENSIONS: &[&str] = &[
    "pdf", "bu", "busa", "imgbu", "imgbusa", "rdv", "vscmr", "vscsa",
];

/// 원시 로그 파일 확장자
pub const DEFAULT_LEAF_EXTENSION: &str = "dat";

/// 진행 상황 로그 간격 (행)
pub const PROGRESS_EVERY_ROWS: u64 = 1000;

/// 수집 단계 설정
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// 요청된 회차에 묶인 날짜. 이 날짜의 라인만 적재됩니다.
    pub round_date: NaiveDate,
    /// 한 트랜잭션에 삽입할 행 수
    pub batch_size: usize,
    /// 건너뛸 엔트리 확장자 (소문자, 점 없이)
    pub ignored_extensions: Vec<String>,
    /// 원시 로그 확장자 (소문자, 점 없이)
    pub leaf_extension: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            round_date: NaiveDate::from_ymd_opt(2022, 10, 2).unwrap_or_default(),
            batch_size: 1000,
            ignored_extensions: DEFAULT_IGNORED_EXTENSIONS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            leaf_extension: DEFAULT_LEAF_EXTENSION.to_owned(),
        }
    }
}

impl IngestConfig {
    /// core 설정과 회차에서 수집 설정을 생성합니다.
    ///
    /// core 설정에 없는 확장 필드는 기본값이 적용됩니다.
    pub fn from_core(core: &UrnlogConfig, round: Round) -> Self {
        Self {
            round_date: core.election.date_of(round),
            batch_size: core.storage.batch_size,
            ..Self::default()
        }
    }

    /// 설정값을 검증합니다.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.batch_size == 0 {
            return Err(IngestError::Config {
                field: "batch_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.leaf_extension.is_empty() || self.leaf_extension.starts_with('.') {
            return Err(IngestError::Config {
                field: "leaf_extension".to_owned(),
                reason: format!(
                    "'{}' must be a non-empty extension without the leading dot",
                    self.leaf_extension
                ),
            });
        }

        if self
            .ignored_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(&self.leaf_extension))
        {
            return Err(IngestError::Config {
                field: "ignored_extensions".to_owned(),
                reason: format!("must not contain the leaf extension '{}'", self.leaf_extension),
            });
        }

        Ok(())
    }
}

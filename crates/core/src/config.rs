//! 설정 관리 — urnlog.toml 파싱 및 런타임 설정
//!
//! [`UrnlogConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`URNLOG_STORAGE_BATCH_SIZE=500` 형식)
//! 3. 설정 파일 (`urnlog.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), urnlog_core::error::UrnlogError> {
//! use urnlog_core::config::UrnlogConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = UrnlogConfig::load("urnlog.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = UrnlogConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, UrnlogError};
use crate::types::{Region, Round};

/// urnlog 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrnlogConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 저장소 설정
    #[serde(default)]
    pub storage: StorageConfig,
    /// 선거 일정
    #[serde(default)]
    pub election: ElectionConfig,
}

impl UrnlogConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, UrnlogError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에서 시작합니다. 환경변수 오버라이드와 검증은 동일하게 적용됩니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, UrnlogError> {
        let mut config = match Self::from_file(path.as_ref()).await {
            Ok(config) => config,
            Err(UrnlogError::Config(ConfigError::FileNotFound { .. })) => Self::default(),
            Err(e) => return Err(e),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, UrnlogError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                UrnlogError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                UrnlogError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, UrnlogError> {
        toml::from_str(toml_str).map_err(|e| {
            UrnlogError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `URNLOG_{SECTION}_{FIELD}`
    /// 예: `URNLOG_GENERAL_DATA_DIR=/srv/urnlog`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "URNLOG_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "URNLOG_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.data_dir, "URNLOG_GENERAL_DATA_DIR");

        // Storage
        override_string(
            &mut self.storage.database_path,
            "URNLOG_STORAGE_DATABASE_PATH",
        );
        override_usize(&mut self.storage.batch_size, "URNLOG_STORAGE_BATCH_SIZE");

        // Election
        override_date(
            &mut self.election.first_round_date,
            "URNLOG_ELECTION_FIRST_ROUND_DATE",
        );
        override_date(
            &mut self.election.second_round_date,
            "URNLOG_ELECTION_SECOND_ROUND_DATE",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), UrnlogError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.general.data_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.data_dir".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.storage.database_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage.database_path".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if self.storage.batch_size == 0 || self.storage.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "storage.batch_size".to_owned(),
                reason: format!("must be between 1 and {MAX_BATCH_SIZE}"),
            }
            .into());
        }

        if self.election.first_round_date == self.election.second_round_date {
            return Err(ConfigError::InvalidValue {
                field: "election.second_round_date".to_owned(),
                reason: "must differ from first_round_date".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 배치 크기 상한
const MAX_BATCH_SIZE: usize = 100_000;

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 데이터 디렉토리 (zips/, tmp/, sequencias/, frequencias/)
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            data_dir: "storage".to_owned(),
        }
    }
}

impl GeneralConfig {
    /// 다운로드된 UF 아카이브 경로: `{data_dir}/zips/{UF}.zip`
    pub fn archive_path(&self, region: Region) -> PathBuf {
        Path::new(&self.data_dir)
            .join("zips")
            .join(format!("{}.zip", region.code()))
    }

    /// UF별 임시 추출 디렉토리: `{data_dir}/tmp/{UF}`
    pub fn scratch_dir(&self, region: Region) -> PathBuf {
        Path::new(&self.data_dir).join("tmp").join(region.code())
    }

    /// 연쇄 탐지 결과 디렉토리
    pub fn sequences_dir(&self) -> PathBuf {
        Path::new(&self.data_dir).join("sequencias")
    }

    /// 빈도 집계 결과 디렉토리
    pub fn frequencies_dir(&self) -> PathBuf {
        Path::new(&self.data_dir).join("frequencias")
    }
}

/// 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite 데이터베이스 파일 경로
    pub database_path: String,
    /// 한 트랜잭션에 삽입할 행 수
    pub batch_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "storage/urnlog.sqlite3".to_owned(),
            batch_size: 1000,
        }
    }
}

/// 선거 일정 설정
///
/// 각 회차는 하나의 고정된 날짜에 묶여 있으며, 그 날짜의 로그 라인만 적재됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionConfig {
    /// 1차 투표일
    pub first_round_date: NaiveDate,
    /// 결선 투표일
    pub second_round_date: NaiveDate,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            first_round_date: NaiveDate::from_ymd_opt(2022, 10, 2).unwrap_or_default(),
            second_round_date: NaiveDate::from_ymd_opt(2022, 10, 30).unwrap_or_default(),
        }
    }
}

impl ElectionConfig {
    /// 회차에 묶인 날짜를 반환합니다.
    pub fn date_of(&self, round: Round) -> NaiveDate {
        match round {
            Round::First => self.first_round_date,
            Round::Second => self.second_round_date,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_date(target: &mut NaiveDate, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match NaiveDate::parse_from_str(val.trim(), "%Y-%m-%d") {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse YYYY-MM-DD date from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = UrnlogConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.storage.batch_size, 1000);
        assert_eq!(
            config.election.first_round_date,
            NaiveDate::from_ymd_opt(2022, 10, 2).unwrap()
        );
        assert_eq!(
            config.election.second_round_date,
            NaiveDate::from_ymd_opt(2022, 10, 30).unwrap()
        );
    }

    #[test]
    fn default_config_passes_validation() {
        UrnlogConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = UrnlogConfig::parse("").unwrap();
        assert_eq!(config.general.data_dir, "storage");
        assert_eq!(config.storage.database_path, "storage/urnlog.sqlite3");
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[election]
second_round_date = "2022-10-31"
"#;
        let config = UrnlogConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(
            config.election.second_round_date,
            NaiveDate::from_ymd_opt(2022, 10, 31).unwrap()
        );
        assert_eq!(
            config.election.first_round_date,
            NaiveDate::from_ymd_opt(2022, 10, 2).unwrap()
        );
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let err = UrnlogConfig::parse("invalid = [[[toml").unwrap_err();
        assert!(matches!(
            err,
            UrnlogError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn from_str_invalid_date_returns_error() {
        let err = UrnlogConfig::parse("[election]\nfirst_round_date = \"02/10/2022\"").unwrap_err();
        assert!(matches!(
            err,
            UrnlogError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = UrnlogConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = UrnlogConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_zero_batch_size() {
        let mut config = UrnlogConfig::default();
        config.storage.batch_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn validate_rejects_identical_round_dates() {
        let mut config = UrnlogConfig::default();
        config.election.second_round_date = config.election.first_round_date;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("second_round_date"));
    }

    #[test]
    fn election_date_of_round() {
        let election = ElectionConfig::default();
        assert_eq!(election.date_of(Round::First), election.first_round_date);
        assert_eq!(election.date_of(Round::Second), election.second_round_date);
    }

    #[test]
    fn general_paths_follow_data_dir() {
        let general = GeneralConfig {
            data_dir: "/srv/urnlog".to_owned(),
            ..GeneralConfig::default()
        };
        assert_eq!(
            general.archive_path(Region::Sp),
            PathBuf::from("/srv/urnlog/zips/SP.zip")
        );
        assert_eq!(
            general.scratch_dir(Region::Sp),
            PathBuf::from("/srv/urnlog/tmp/SP")
        );
        assert_eq!(
            general.sequences_dir(),
            PathBuf::from("/srv/urnlog/sequencias")
        );
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_URNLOG_STR", "overridden") };
        override_string(&mut val, "TEST_URNLOG_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_URNLOG_STR") };
    }

    #[test]
    fn env_override_date_invalid_keeps_original() {
        let original = NaiveDate::from_ymd_opt(2022, 10, 2).unwrap();
        let mut val = original;
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_URNLOG_DATE_BAD", "yesterday") };
        override_date(&mut val, "TEST_URNLOG_DATE_BAD");
        assert_eq!(val, original);
        unsafe { std::env::remove_var("TEST_URNLOG_DATE_BAD") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = 7usize;
        override_usize(&mut val, "TEST_URNLOG_NONEXISTENT_12345");
        assert_eq!(val, 7);
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = UrnlogConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = UrnlogConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.data_dir, parsed.general.data_dir);
        assert_eq!(
            config.election.second_round_date,
            parsed.election.second_round_date
        );
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let err = UrnlogConfig::from_file("/nonexistent/path/urnlog.toml")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UrnlogError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn load_or_default_tolerates_missing_file() {
        let config = UrnlogConfig::load_or_default("/nonexistent/path/urnlog.toml")
            .await
            .unwrap();
        assert_eq!(config.storage.batch_size, 1000);
    }
}

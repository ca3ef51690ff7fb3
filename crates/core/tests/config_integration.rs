//! urnlog.toml 통합 설정 테스트
//!
//! - urnlog.toml.example 파싱 테스트
//! - 부분 설정 (일부 섹션만) 로딩 테스트
//! - 환경변수 우선순위 테스트
//! - 빈 파일 / 잘못된 형식 에러 테스트

use chrono::NaiveDate;
use serial_test::serial;
use urnlog_core::config::UrnlogConfig;
use urnlog_core::error::{ConfigError, UrnlogError};

// =============================================================================
// urnlog.toml.example 파싱 테스트
// =============================================================================

#[test]
fn example_config_parses_successfully() {
    let content = include_str!("../../../urnlog.toml.example");
    let config = UrnlogConfig::parse(content).expect("example config should parse");

    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.general.log_format, "pretty");
    assert_eq!(config.general.data_dir, "storage");
    assert_eq!(config.storage.database_path, "storage/urnlog.sqlite3");
    assert_eq!(config.storage.batch_size, 1000);
}

#[test]
fn example_config_passes_validation() {
    let content = include_str!("../../../urnlog.toml.example");
    let config = UrnlogConfig::parse(content).expect("should parse");
    config
        .validate()
        .expect("example config should pass validation");
}

#[test]
fn example_config_matches_defaults() {
    let content = include_str!("../../../urnlog.toml.example");
    let config = UrnlogConfig::parse(content).expect("should parse");
    let defaults = UrnlogConfig::default();

    assert_eq!(
        config.election.first_round_date,
        defaults.election.first_round_date
    );
    assert_eq!(
        config.election.second_round_date,
        defaults.election.second_round_date
    );
}

// =============================================================================
// 파일 로딩 테스트
// =============================================================================

#[tokio::test]
#[serial]
async fn load_partial_file_merges_with_defaults() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("urnlog.toml");
    std::fs::write(&path, "[storage]\nbatch_size = 250\n").expect("should write config");

    let config = UrnlogConfig::load(&path).await.expect("should load");
    assert_eq!(config.storage.batch_size, 250);
    assert_eq!(config.general.log_level, "info");
}

#[tokio::test]
#[serial]
async fn load_empty_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("urnlog.toml");
    std::fs::write(&path, "").expect("should write config");

    let config = UrnlogConfig::load(&path).await.expect("should load");
    assert_eq!(config.general.data_dir, "storage");
}

#[tokio::test]
#[serial]
async fn load_rejects_invalid_value_from_file() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("urnlog.toml");
    std::fs::write(&path, "[general]\nlog_format = \"xml\"\n").expect("should write config");

    let err = UrnlogConfig::load(&path).await.unwrap_err();
    assert!(matches!(
        err,
        UrnlogError::Config(ConfigError::InvalidValue { .. })
    ));
}

#[tokio::test]
#[serial]
async fn load_missing_file_is_an_error() {
    let err = UrnlogConfig::load("/nonexistent/urnlog.toml")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        UrnlogError::Config(ConfigError::FileNotFound { .. })
    ));
}

// =============================================================================
// 환경변수 우선순위 테스트
// =============================================================================

#[tokio::test]
#[serial]
async fn env_overrides_take_precedence_over_file() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("urnlog.toml");
    std::fs::write(
        &path,
        "[general]\ndata_dir = \"/from/file\"\n[election]\nsecond_round_date = \"2022-10-30\"\n",
    )
    .expect("should write config");

    // SAFETY: #[serial]로 환경변수를 건드리는 테스트를 직렬화합니다.
    unsafe {
        std::env::set_var("URNLOG_GENERAL_DATA_DIR", "/from/env");
        std::env::set_var("URNLOG_ELECTION_SECOND_ROUND_DATE", "2022-11-06");
    }

    let result = UrnlogConfig::load(&path).await;

    unsafe {
        std::env::remove_var("URNLOG_GENERAL_DATA_DIR");
        std::env::remove_var("URNLOG_ELECTION_SECOND_ROUND_DATE");
    }

    let config = result.expect("should load");
    assert_eq!(config.general.data_dir, "/from/env");
    assert_eq!(
        config.election.second_round_date,
        NaiveDate::from_ymd_opt(2022, 11, 6).unwrap()
    );
}

#[tokio::test]
#[serial]
async fn env_override_with_bad_number_keeps_file_value() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("urnlog.toml");
    std::fs::write(&path, "[storage]\nbatch_size = 42\n").expect("should write config");

    // SAFETY: #[serial]로 환경변수를 건드리는 테스트를 직렬화합니다.
    unsafe { std::env::set_var("URNLOG_STORAGE_BATCH_SIZE", "many") };
    let result = UrnlogConfig::load(&path).await;
    unsafe { std::env::remove_var("URNLOG_STORAGE_BATCH_SIZE") };

    assert_eq!(result.expect("should load").storage.batch_size, 42);
}

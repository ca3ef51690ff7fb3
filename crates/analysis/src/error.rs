//! 분석 단계 에러 타입
//!
//! [`AnalysisError`]는 커서 소비와 보고서 출력 중 발생하는 에러를 표현합니다.
//! 출력 에러는 해당 실행에 치명적이며, 일부만 쓰인 보고서 파일은 지워집니다.

use urnlog_core::error::{StoreError, UrnlogError};

/// 분석 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// 보고서 파일 생성/쓰기 실패
    #[error("report output error: {path}: {reason}")]
    Output {
        /// 보고서 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 분석 매개변수 에러
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// 매개변수 이름
        name: String,
        /// 에러 사유
        reason: String,
    },

    /// 커서 에러 (재시도 없이 전파)
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<AnalysisError> for UrnlogError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Store(e) => UrnlogError::Store(e),
            other => UrnlogError::Analysis(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_error_display() {
        let err = AnalysisError::Output {
            path: "storage/sequencias/SP-1t-5s-5q.csv".to_owned(),
            reason: "permission denied".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("SP-1t-5s-5q.csv"));
        assert!(msg.contains("permission denied"));
    }

    #[test]
    fn store_error_keeps_its_kind_at_top_level() {
        let err = AnalysisError::from(StoreError::Query("no such table".to_owned()));
        let top: UrnlogError = err.into();
        assert!(matches!(top, UrnlogError::Store(_)));
    }

    #[test]
    fn output_error_becomes_analysis_error() {
        let err = AnalysisError::Output {
            path: "x.csv".to_owned(),
            reason: "disk full".to_owned(),
        };
        let top: UrnlogError = err.into();
        assert!(matches!(top, UrnlogError::Analysis(_)));
    }
}

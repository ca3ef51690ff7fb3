//! 수집 단계 에러 타입
//!
//! [`IngestError`]는 아카이브 추출, 라인 파싱, 적재 중 발생하는 에러를 표현합니다.
//! `From<IngestError> for UrnlogError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! 컨테이너/엔트리 에러는 대부분 워커 내부에서 복구되어 경고로만 남고,
//! 루트 아카이브와 저장소 에러만 호출자까지 올라갑니다.

use urnlog_core::error::{StoreError, UrnlogError};

/// 수집 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 루트 아카이브를 열 수 없음 (실행 전체 실패)
    #[error("root archive {path}: {reason}")]
    RootArchive {
        /// 아카이브 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 컨테이너 열기 실패 또는 구조적으로 잘못된 컨테이너
    #[error("container open error: {path}: {reason}")]
    ContainerOpen {
        /// 컨테이너 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 알 수 없는 컨테이너 시그니처
    #[error("unrecognized container format: {path}")]
    ContainerFormat {
        /// 컨테이너 경로
        path: String,
    },

    /// 개별 엔트리 추출 실패
    #[error("entry extraction error: {container}!{entry}: {reason}")]
    EntryExtract {
        /// 엔트리를 담은 컨테이너 경로
        container: String,
        /// 엔트리 이름
        entry: String,
        /// 실패 사유
        reason: String,
    },

    /// 추출 디렉토리 밖을 가리키는 엔트리 이름
    #[error("unsafe entry name in {container}: '{entry}'")]
    UnsafeEntryName {
        /// 컨테이너 경로
        container: String,
        /// 엔트리 이름
        entry: String,
    },

    /// 임시 추출 디렉토리 준비 실패
    #[error("scratch directory error: {path}: {reason}")]
    Scratch {
        /// 디렉토리 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 저장소 쓰기 에러 (재시도 없이 전파)
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IngestError> for UrnlogError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Store(e) => UrnlogError::Store(e),
            IngestError::Io(e) => UrnlogError::Io(e),
            other => UrnlogError::Ingest(other.to_string()),
        }
    }
}

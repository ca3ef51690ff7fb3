//! 에러 타입 — 도메인별 에러 정의

/// urnlog 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum UrnlogError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 입력값 검증 에러 (I/O 이전 단계)
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    /// 저장소 에러
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// 수집/적재 단계 에러
    #[error("ingest error: {0}")]
    Ingest(String),

    /// 분석 단계 에러
    #[error("analysis error: {0}")]
    Analysis(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 명령 인자 검증 에러
///
/// 어떤 부수 효과도 일어나기 전에 반환됩니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// 알 수 없는 UF 코드
    #[error("UF inválida: '{0}'")]
    Region(String),

    /// 1, 2 이외의 turno
    #[error("Turno deve ser 1 ou 2 (recebido '{0}')")]
    Round(String),

    /// 1 이상의 정수가 아닌 숫자 인자
    #[error("{field} deve ser um número inteiro igual ou maior que um (recebido '{value}')")]
    NotPositive { field: String, value: String },
}

/// 저장소 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 연결(파일 열기) 실패
    #[error("connection failed: {0}")]
    Connection(String),

    /// 스키마 생성/삭제 실패
    #[error("schema failed for {table}: {reason}")]
    Schema { table: String, reason: String },

    /// 쓰기 실패
    #[error("write failed for {table}: {reason}")]
    Write { table: String, reason: String },

    /// 쿼리 실패
    #[error("query failed: {0}")]
    Query(String),

    /// 저장된 행을 도메인 타입으로 변환하지 못함
    #[error("corrupt row {id} in {table}: {reason}")]
    CorruptRow {
        table: String,
        id: i64,
        reason: String,
    },
}

//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 익스포터가 설치되지 않았으면 기록은 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `urnlog_`
//! - 단계명: `ingest_`, `load_`, `analysis_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(urnlog_core::metrics::INGEST_LINES_REJECTED_TOTAL).increment(1);
//! ```

use metrics::{Unit, describe_counter};

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 컨테이너 형식 레이블 키 (zip, 7z)
pub const LABEL_FORMAT: &str = "format";

/// 분석 모드 레이블 키 (sequences, frequencies)
pub const LABEL_MODE: &str = "mode";

// ─── Ingest 메트릭 ─────────────────────────────────────────────────

/// Ingest: 열린 컨테이너 수 (counter, label: format)
pub const INGEST_CONTAINERS_OPENED_TOTAL: &str = "urnlog_ingest_containers_opened_total";

/// Ingest: 열기/추출 실패로 건너뛴 컨테이너 하위 트리 수 (counter)
pub const INGEST_CONTAINERS_SKIPPED_TOTAL: &str = "urnlog_ingest_containers_skipped_total";

/// Ingest: 추출된 원시 로그 파일 수 (counter)
pub const INGEST_LEAVES_EXTRACTED_TOTAL: &str = "urnlog_ingest_leaves_extracted_total";

/// Ingest: 파싱에 성공한 라인 수 (counter)
pub const INGEST_LINES_PARSED_TOTAL: &str = "urnlog_ingest_lines_parsed_total";

/// Ingest: 디코딩/파싱 실패로 버려진 라인 수 (counter)
pub const INGEST_LINES_REJECTED_TOTAL: &str = "urnlog_ingest_lines_rejected_total";

/// Ingest: 회차 날짜가 달라 걸러진 라인 수 (counter)
pub const INGEST_LINES_FILTERED_TOTAL: &str = "urnlog_ingest_lines_filtered_total";

// ─── Load 메트릭 ───────────────────────────────────────────────────

/// Load: 적재된 행 수 (counter)
pub const LOAD_ROWS_INSERTED_TOTAL: &str = "urnlog_load_rows_inserted_total";

// ─── Analysis 메트릭 ───────────────────────────────────────────────

/// Analysis: 커서에서 읽은 행 수 (counter, label: mode)
pub const ANALYSIS_ROWS_READ_TOTAL: &str = "urnlog_analysis_rows_read_total";

/// Analysis: 기록된 연쇄 수 (counter)
pub const ANALYSIS_SEQUENCES_FOUND_TOTAL: &str = "urnlog_analysis_sequences_found_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 익스포터를 설치한 직후 한 번 호출합니다.
pub fn describe_all() {
    describe_counter!(
        INGEST_CONTAINERS_OPENED_TOTAL,
        Unit::Count,
        "Containers opened by the archive walker"
    );
    describe_counter!(
        INGEST_CONTAINERS_SKIPPED_TOTAL,
        Unit::Count,
        "Container subtrees skipped after an open or extraction failure"
    );
    describe_counter!(
        INGEST_LEAVES_EXTRACTED_TOTAL,
        Unit::Count,
        "Raw log files extracted"
    );
    describe_counter!(
        INGEST_LINES_PARSED_TOTAL,
        Unit::Count,
        "Log lines decoded and parsed"
    );
    describe_counter!(
        INGEST_LINES_REJECTED_TOTAL,
        Unit::Count,
        "Log lines dropped on a decode or parse failure"
    );
    describe_counter!(
        INGEST_LINES_FILTERED_TOTAL,
        Unit::Count,
        "Log lines dated outside the requested round"
    );
    describe_counter!(
        LOAD_ROWS_INSERTED_TOTAL,
        Unit::Count,
        "Rows inserted into the store"
    );
    describe_counter!(
        ANALYSIS_ROWS_READ_TOTAL,
        Unit::Count,
        "Cursor rows consumed by an analysis"
    );
    describe_counter!(
        ANALYSIS_SEQUENCES_FOUND_TOTAL,
        Unit::Count,
        "Qualifying vote sequences written"
    );
}

//! 수집 파이프라인 오케스트레이션
//!
//! ```text
//! {UF}.zip --> ArchiveWalker --(LeafLog)--> RecordReader --(EventDraft)--> Loader --> EventStore
//! ```
//!
//! 모든 단계가 앞 단계의 지연 이터레이터를 끌어당기는 단일 스레드 동기 파이프라인입니다.
//! 호출자는 비동기 런타임에서 `spawn_blocking`으로 실행해야 합니다.

use std::path::Path;

use tracing::{info, warn};
use urnlog_core::error::StoreError;
use urnlog_core::pipeline::EventStore;
use urnlog_core::types::TargetTable;

use crate::archive::{ArchiveWalker, WalkStats};
use crate::config::IngestConfig;
use crate::diagnostics::DiagnosticsSink;
use crate::error::IngestError;
use crate::loader::Loader;
use crate::parser::RecordParser;

/// 한 번의 수집 실행 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// 처리한 원시 로그 파일 수
    pub files: u64,
    /// 적재된 행 수
    pub rows: u64,
    /// 디코딩/파싱 실패로 버린 라인 수
    pub rejected_lines: u64,
    /// 회차 날짜가 달라 걸러낸 라인 수
    pub filtered_lines: u64,
    /// 아카이브 워커 통계
    pub walk: WalkStats,
}

/// 아카이브 하나를 풀고 파싱해 대상 테이블에 적재합니다.
///
/// 루트 아카이브를 먼저 열어 보고, 열리는 경우에만 `open_store`로 저장소를 열어
/// 대상 테이블을 다시 만듭니다. 루트가 열리지 않으면 저장소 파일도 생기지 않습니다.
/// 하위 컨테이너와 라인 단위 실패는 경고/진단으로 남기고 계속 진행합니다.
pub fn run_ingest<S, F, D>(
    archive: &Path,
    scratch_dir: &Path,
    target: TargetTable,
    config: &IngestConfig,
    open_store: F,
    mut diagnostics: D,
) -> Result<LoadReport, IngestError>
where
    S: EventStore,
    F: FnOnce() -> Result<S, StoreError>,
    D: DiagnosticsSink,
{
    let mut walker = ArchiveWalker::open(archive, scratch_dir, config)?;
    let mut loader = Loader::begin(open_store()?, target, config.batch_size)?;
    let parser = RecordParser::new(config.round_date);
    let mut report = LoadReport::default();

    info!(
        archive = %archive.display(),
        table = %target,
        round_date = %config.round_date,
        "ingest started"
    );

    for leaf in walker.by_ref() {
        let mut reader = match parser.open(&leaf, &mut diagnostics) {
            Ok(reader) => reader,
            Err(e) => {
                warn!(file = %leaf.path.display(), origin = %leaf.origin, error = %e, "cannot open log file, skipping");
                continue;
            }
        };

        let rows = loader.load(reader.by_ref())?;
        let stats = reader.stats();

        report.files += 1;
        report.rejected_lines += stats.rejected;
        report.filtered_lines += stats.filtered;

        info!(
            origin = %leaf.origin,
            rows,
            rejected = stats.rejected,
            "log file loaded"
        );

        // 추출된 원시 로그는 적재 직후 필요 없음
        let _ = std::fs::remove_file(&leaf.path);
    }

    let (_, rows) = loader.finish()?;
    report.rows = rows;
    report.walk = walker.stats();

    info!(
        table = %target,
        files = report.files,
        rows = report.rows,
        rejected = report.rejected_lines,
        containers_skipped = report.walk.containers_skipped,
        "ingest finished"
    );
    Ok(report)
}

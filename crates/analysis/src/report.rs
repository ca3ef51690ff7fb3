//! CSV 보고서 출력
//!
//! 보고서는 `;`로 구분되며 첫 줄은 헤더입니다.
//! - 연쇄: `uf;id;arquivo;data_hora;segundos_depois`
//! - 빈도: `uf;segundos_depois;frequencia`
//!
//! [`commit`](SequenceCsv::commit)되지 않은 채 drop된 보고서 파일은 삭제되므로
//! 실패한 실행이 일부만 쓰인 파일을 남기지 않습니다.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use urnlog_core::types::{DATE_TIME_FORMAT, Region, TargetTable};

use crate::error::AnalysisError;
use crate::frequency::{FrequencyBucket, FrequencySink};
use crate::sequence::{SequenceParams, SequenceRow, SequenceSink};

pub const SEQUENCE_HEADER: [&str; 5] = ["uf", "id", "arquivo", "data_hora", "segundos_depois"];
pub const FREQUENCY_HEADER: [&str; 3] = ["uf", "segundos_depois", "frequencia"];

const DELIMITER: u8 = b';';

/// 연쇄 보고서 경로: `{dir}/{UF}-{n}t-{T}s-{Q}q.csv`
pub fn sequence_report_path(dir: &Path, target: &TargetTable, params: &SequenceParams) -> PathBuf {
    dir.join(format!(
        "{}-{}t-{}s-{}q.csv",
        target.region.code(),
        target.round.number(),
        params.max_gap_secs,
        params.min_gaps
    ))
}

/// 빈도 보고서 경로: `{dir}/{UF}-{n}t.csv`
pub fn frequency_report_path(dir: &Path, target: &TargetTable) -> PathBuf {
    dir.join(format!(
        "{}-{}t.csv",
        target.region.code(),
        target.round.number()
    ))
}

/// 커밋 전까지는 임시로 취급되는 CSV 파일
struct CsvFile {
    path: PathBuf,
    writer: csv::Writer<File>,
    committed: bool,
}

impl CsvFile {
    fn create(path: &Path, header: &[&str]) -> Result<Self, AnalysisError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| output_error(parent, e))?;
        }

        let file = File::create(path).map_err(|e| output_error(path, e))?;
        let writer = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .from_writer(file);

        let mut report = Self {
            path: path.to_path_buf(),
            writer,
            committed: false,
        };
        report.write(header)?;
        debug!(path = %path.display(), "report file created");
        Ok(report)
    }

    fn write<I, T>(&mut self, record: I) -> Result<(), AnalysisError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.writer
            .write_record(record)
            .map_err(|e| output_error(&self.path, e))
    }

    fn commit(mut self) -> Result<PathBuf, AnalysisError> {
        self.writer.flush().map_err(|e| output_error(&self.path, e))?;
        self.writer
            .get_ref()
            .sync_all()
            .map_err(|e| output_error(&self.path, e))?;
        self.committed = true;
        Ok(self.path.clone())
    }
}

impl Drop for CsvFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "partial report removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove partial report"
            ),
        }
    }
}

/// 연쇄 보고서 CSV
pub struct SequenceCsv {
    region: Region,
    file: CsvFile,
}

impl SequenceCsv {
    /// 파일을 만들고 헤더를 씁니다. 상위 디렉토리가 없으면 만듭니다.
    pub fn create(path: &Path, region: Region) -> Result<Self, AnalysisError> {
        Ok(Self {
            region,
            file: CsvFile::create(path, &SEQUENCE_HEADER)?,
        })
    }

    /// 버퍼를 비우고 파일을 확정합니다.
    pub fn commit(self) -> Result<PathBuf, AnalysisError> {
        self.file.commit()
    }
}

impl SequenceSink for SequenceCsv {
    fn write_row(&mut self, row: &SequenceRow) -> Result<(), AnalysisError> {
        self.file.write([
            self.region.code().to_owned(),
            row.id.to_string(),
            row.source_file.clone(),
            row.timestamp.format(DATE_TIME_FORMAT).to_string(),
            row.gap_seconds.to_string(),
        ])
    }
}

/// 빈도 보고서 CSV
pub struct FrequencyCsv {
    region: Region,
    file: CsvFile,
}

impl FrequencyCsv {
    /// 파일을 만들고 헤더를 씁니다. 상위 디렉토리가 없으면 만듭니다.
    pub fn create(path: &Path, region: Region) -> Result<Self, AnalysisError> {
        Ok(Self {
            region,
            file: CsvFile::create(path, &FREQUENCY_HEADER)?,
        })
    }

    pub fn commit(self) -> Result<PathBuf, AnalysisError> {
        self.file.commit()
    }
}

impl FrequencySink for FrequencyCsv {
    fn write_bucket(&mut self, bucket: &FrequencyBucket) -> Result<(), AnalysisError> {
        self.file.write([
            self.region.code().to_owned(),
            bucket.gap_seconds.to_string(),
            bucket.count.to_string(),
        ])
    }
}

fn output_error(path: &Path, e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::Output {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

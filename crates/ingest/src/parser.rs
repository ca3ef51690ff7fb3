//! 투표기 로그 라인 파서
//!
//! 원시 로그는 탭으로 구분된 ISO-8859-15 텍스트입니다.
//!
//! # 라인 형식
//! ```text
//! DD/MM/YYYY HH:MM:SS \t tipo \t pleito \t evento \t mensagem [\t hash]
//! ```
//!
//! 어느 한 필드라도 디코딩/파싱에 실패하면 라인 전체를 버리고 진단 싱크에 기록합니다.
//! 파일 처리는 중단하지 않습니다. 파싱에 성공한 라인도 요청된 회차 날짜와
//! 일치하지 않으면 조용히 걸러집니다.
//!
//! # 사용 예시
//! ```ignore
//! use urnlog_ingest::parser::parse_line;
//!
//! let draft = parse_line(
//!     b"02/10/2022 08:00:01\tINFO\t00407\tVOTA\tO voto do eleitor foi computado\tA1B2",
//!     "o00407.logjez",
//! )?;
//! assert!(draft.vote_confirmed());
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use encoding_rs::ISO_8859_15;
use metrics::counter;
use tracing::{debug, warn};
use urnlog_core::metrics as names;
use urnlog_core::types::EventDraft;

use crate::archive::LeafLog;
use crate::diagnostics::{DiagnosticsSink, LineFailure};
use crate::error::IngestError;

/// 원시 로그의 일시 형식
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// 필수 필드 수 (hash 제외)
pub const REQUIRED_FIELDS: usize = 5;

const FIELD_SEPARATOR: u8 = b'\t';

/// 라인 단위 실패 사유
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    /// 텍스트로 매핑되지 않는 바이트
    #[error("field {field}: byte 0x{byte:02X} at offset {offset} is not printable ISO-8859-15")]
    Decode {
        /// 0부터 시작하는 필드 위치
        field: usize,
        byte: u8,
        offset: usize,
    },

    /// 필드 수 부족
    #[error("expected at least 5 fields, found {found}")]
    FieldCount { found: usize },

    /// 첫 필드가 일시 형식이 아님
    #[error("invalid timestamp '{value}': {reason}")]
    Timestamp { value: String, reason: String },
}

/// 필드 하나를 ISO-8859-15에서 디코딩합니다.
///
/// C0 제어 문자(탭 제외), DEL, `0x80..=0x9F`는 실패로 봅니다.
pub fn decode_field(index: usize, raw: &[u8]) -> Result<String, LineError> {
    if let Some(offset) = raw
        .iter()
        .position(|&b| (b < 0x20 && b != b'\t') || (0x7F..=0x9F).contains(&b))
    {
        return Err(LineError::Decode {
            field: index,
            byte: raw[offset],
            offset,
        });
    }

    let (text, _) = ISO_8859_15.decode_without_bom_handling(raw);
    Ok(text.into_owned())
}

/// 라인 하나(줄바꿈 제외)를 파싱합니다. 회차 필터는 적용하지 않습니다.
pub fn parse_line(raw: &[u8], source_file: &str) -> Result<EventDraft, LineError> {
    let raw_fields: Vec<&[u8]> = raw.split(|&b| b == FIELD_SEPARATOR).collect();
    if raw_fields.len() < REQUIRED_FIELDS {
        return Err(LineError::FieldCount {
            found: raw_fields.len(),
        });
    }

    let fields = raw_fields
        .iter()
        .enumerate()
        .map(|(index, field)| decode_field(index, field))
        .collect::<Result<Vec<_>, _>>()?;

    let stamp = fields[0].trim();
    let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).map_err(|e| {
        LineError::Timestamp {
            value: stamp.to_owned(),
            reason: e.to_string(),
        }
    })?;

    let hash = fields
        .get(5)
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .map(str::to_owned);

    Ok(EventDraft::new(
        timestamp,
        fields[1].trim(),
        fields[2].trim(),
        fields[3].trim(),
        fields[4].trim(),
        hash,
        source_file,
    ))
}

/// 파일 하나를 읽는 동안의 라인 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// 읽은 라인 수 (빈 라인 포함)
    pub lines: u64,
    /// 내보낸 이벤트 수
    pub accepted: u64,
    /// 디코딩/파싱 실패로 버린 라인 수
    pub rejected: u64,
    /// 회차 날짜가 달라 걸러낸 라인 수
    pub filtered: u64,
}

/// 회차 날짜에 묶인 레코드 파서
#[derive(Debug, Clone, Copy)]
pub struct RecordParser {
    round_date: NaiveDate,
}

impl RecordParser {
    pub fn new(round_date: NaiveDate) -> Self {
        Self { round_date }
    }

    /// 이벤트가 요청된 회차 날짜에 속하는지 확인합니다.
    pub fn in_round(&self, draft: &EventDraft) -> bool {
        draft.timestamp.date() == self.round_date
    }

    /// 추출된 로그 파일을 열어 리더를 만듭니다.
    pub fn open<D: DiagnosticsSink>(
        &self,
        leaf: &LeafLog,
        diagnostics: D,
    ) -> Result<RecordReader<BufReader<File>, D>, IngestError> {
        let file = File::open(&leaf.path)?;
        Ok(self.read(
            BufReader::new(file),
            leaf.path.clone(),
            leaf.origin.clone(),
            diagnostics,
        ))
    }

    /// 임의의 버퍼 리더 위에 레코드 리더를 만듭니다.
    ///
    /// `file`은 진단용 경로, `source_file`은 이벤트에 기록될 원본 아카이브 이름입니다.
    pub fn read<R: BufRead, D: DiagnosticsSink>(
        &self,
        reader: R,
        file: PathBuf,
        source_file: String,
        diagnostics: D,
    ) -> RecordReader<R, D> {
        RecordReader {
            reader,
            file,
            source_file,
            parser: *self,
            diagnostics,
            buf: Vec::with_capacity(256),
            stats: ReadStats::default(),
            done: false,
        }
    }
}

/// 로그 파일 하나의 이벤트 이터레이터
///
/// 한 번만 순회할 수 있습니다. 읽기 중 I/O 에러가 나면 경고를 남기고
/// 그 파일을 거기서 끝냅니다.
pub struct RecordReader<R, D> {
    reader: R,
    file: PathBuf,
    source_file: String,
    parser: RecordParser,
    diagnostics: D,
    buf: Vec<u8>,
    stats: ReadStats,
    done: bool,
}

impl<R, D> RecordReader<R, D> {
    pub fn stats(&self) -> ReadStats {
        self.stats
    }

    /// 진단 싱크를 돌려받습니다.
    pub fn into_diagnostics(self) -> D {
        self.diagnostics
    }
}

impl<R: BufRead, D: DiagnosticsSink> Iterator for RecordReader<R, D> {
    type Item = EventDraft;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    debug!(
                        file = %self.file.display(),
                        lines = self.stats.lines,
                        accepted = self.stats.accepted,
                        rejected = self.stats.rejected,
                        "log file exhausted"
                    );
                }
                Ok(_) => {
                    self.stats.lines += 1;
                    if let Some(draft) = self.handle_line() {
                        return Some(draft);
                    }
                }
                Err(e) => {
                    self.done = true;
                    warn!(
                        file = %self.file.display(),
                        line = self.stats.lines + 1,
                        error = %e,
                        "read error, truncating log file"
                    );
                }
            }
        }
        None
    }
}

impl<R: BufRead, D: DiagnosticsSink> FusedIterator for RecordReader<R, D> {}

impl<R, D: DiagnosticsSink> RecordReader<R, D> {
    fn handle_line(&mut self) -> Option<EventDraft> {
        let mut line = self.buf.as_slice();
        if let Some(stripped) = line.strip_suffix(b"\n") {
            line = stripped;
        }
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }
        if line.is_empty() {
            return None;
        }

        match parse_line(line, &self.source_file) {
            Ok(draft) if self.parser.in_round(&draft) => {
                self.stats.accepted += 1;
                counter!(names::INGEST_LINES_PARSED_TOTAL).increment(1);
                Some(draft)
            }
            Ok(_) => {
                self.stats.filtered += 1;
                counter!(names::INGEST_LINES_PARSED_TOTAL).increment(1);
                counter!(names::INGEST_LINES_FILTERED_TOTAL).increment(1);
                None
            }
            Err(e) => {
                self.stats.rejected += 1;
                counter!(names::INGEST_LINES_REJECTED_TOTAL).increment(1);
                self.diagnostics.record(LineFailure {
                    file: self.file.clone(),
                    line: self.stats.lines,
                    fields: line
                        .split(|&b| b == FIELD_SEPARATOR)
                        .map(|f| ISO_8859_15.decode_without_bom_handling(f).0.into_owned())
                        .collect(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}

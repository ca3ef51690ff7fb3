//! SQLite 저장소
//!
//! [`EventStore`]와 [`QueryEngine`]을 하나의 연결 위에 구현합니다.
//! 배치 하나가 트랜잭션 하나이며, 커서는 살아 있는 statement에서 한 행씩 읽어
//! 방문자에게 넘기므로 결과 전체를 메모리에 올리지 않습니다.
//!
//! # 사용 예시
//! ```ignore
//! use urnlog_store::SqliteStore;
//!
//! let store = SqliteStore::open("storage/urnlog.sqlite3")?;
//! store.scan_gap_frequencies(&target, |bucket| {
//!     println!("{:?} {}", bucket.gap_seconds, bucket.count);
//!     Ok::<_, StoreError>(())
//! })?;
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};
use tracing::{debug, info};
use urnlog_core::error::StoreError;
use urnlog_core::pipeline::{EventStore, QueryEngine};
use urnlog_core::types::{
    DATE_TIME_FORMAT, EventDraft, GapFrequency, LogEvent, PartitionRow, TargetTable,
};

use crate::schema;

/// SQLite 연결 하나를 감싼 저장소
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// 데이터베이스 파일을 열거나 만듭니다. 상위 디렉토리가 없으면 만듭니다.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Connection(format!("{}: {e}", parent.display()))
            })?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| StoreError::Connection(format!("{}: {e}", path.display())))?;

        let connection_error = |e: rusqlite::Error| StoreError::Connection(format!("{}: {e}", path.display()));
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
            .map_err(connection_error)?;
        conn.pragma_update(None, "synchronous", "NORMAL")
            .map_err(connection_error)?;

        info!(path = %path.display(), "store opened");
        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
        })
    }

    /// 테스트용 인메모리 저장소
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { conn, path: None })
    }

    /// 파일 경로 (인메모리면 `None`)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 대상 테이블이 존재하는지 확인합니다.
    pub fn table_exists(&self, target: &TargetTable) -> Result<bool, StoreError> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![target.table_name()],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_error)?;
        Ok(found.is_some())
    }

    /// 대상 테이블의 행 수
    pub fn count_rows(&self, target: &TargetTable) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row(&schema::count_sql(target), [], |row| row.get(0))
            .map_err(query_error)?;
        Ok(count.max(0) as u64)
    }

    /// 대상 테이블의 모든 행을 id 순으로 읽습니다.
    ///
    /// 결과 전체를 메모리에 올리므로 검증/디버깅 용도로만 씁니다.
    pub fn fetch_events(&self, target: &TargetTable) -> Result<Vec<LogEvent>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&schema::select_all_sql(target))
            .map_err(query_error)?;
        let mut rows = stmt.query([]).map_err(query_error)?;

        let mut events = Vec::new();
        while let Some(row) = rows.next().map_err(query_error)? {
            events.push(read_event(target, row)?);
        }
        Ok(events)
    }
}

impl EventStore for SqliteStore {
    fn recreate(&mut self, target: &TargetTable) -> Result<(), StoreError> {
        let tx = self.conn.transaction().map_err(|e| schema_error(target, e))?;
        tx.execute_batch(&schema::recreate_sql(target))
            .map_err(|e| schema_error(target, e))?;
        tx.commit().map_err(|e| schema_error(target, e))?;

        debug!(table = %target, "table recreated");
        Ok(())
    }

    fn insert_batch(
        &mut self,
        target: &TargetTable,
        drafts: &[EventDraft],
    ) -> Result<(), StoreError> {
        let tx = self.conn.transaction().map_err(|e| write_error(target, e))?;
        {
            let mut stmt = tx
                .prepare_cached(&schema::insert_sql(target))
                .map_err(|e| write_error(target, e))?;

            for draft in drafts {
                stmt.execute(params![
                    draft.timestamp.format(DATE_TIME_FORMAT).to_string(),
                    draft.kind,
                    draft.contest_code,
                    draft.category,
                    draft.message,
                    draft.hash,
                    draft.vote_confirmed(),
                    draft.source_file,
                ])
                .map_err(|e| write_error(target, e))?;
            }
        }
        tx.commit().map_err(|e| write_error(target, e))?;
        Ok(())
    }
}

impl QueryEngine for SqliteStore {
    fn scan_vote_chains<E, F>(
        &self,
        target: &TargetTable,
        max_gap_secs: u32,
        mut visit: F,
    ) -> Result<(), E>
    where
        E: From<StoreError>,
        F: FnMut(PartitionRow) -> Result<(), E>,
    {
        let mut stmt = self
            .conn
            .prepare(&schema::vote_chain_sql(target))
            .map_err(query_error)?;
        let mut rows = stmt.query(params![max_gap_secs]).map_err(query_error)?;

        while let Some(row) = rows.next().map_err(query_error)? {
            visit(read_partition_row(target, row)?)?;
        }
        Ok(())
    }

    fn scan_gap_frequencies<E, F>(&self, target: &TargetTable, mut visit: F) -> Result<(), E>
    where
        E: From<StoreError>,
        F: FnMut(GapFrequency) -> Result<(), E>,
    {
        let mut stmt = self
            .conn
            .prepare(&schema::gap_frequency_sql(target))
            .map_err(query_error)?;
        let mut rows = stmt.query([]).map_err(query_error)?;

        while let Some(row) = rows.next().map_err(query_error)? {
            let gap_seconds: Option<i64> = row.get(0).map_err(query_error)?;
            let count: i64 = row.get(1).map_err(query_error)?;
            visit(GapFrequency {
                gap_seconds,
                count: count.max(0) as u64,
            })?;
        }
        Ok(())
    }
}

fn read_partition_row(target: &TargetTable, row: &Row<'_>) -> Result<PartitionRow, StoreError> {
    let id: i64 = row.get(0).map_err(query_error)?;
    let stamp: String = row.get(2).map_err(query_error)?;
    Ok(PartitionRow {
        id,
        source_file: row.get(1).map_err(query_error)?,
        timestamp: parse_timestamp(target, id, &stamp)?,
        previous_id: row.get(3).map_err(query_error)?,
        gap_seconds: row.get(4).map_err(query_error)?,
    })
}

fn read_event(target: &TargetTable, row: &Row<'_>) -> Result<LogEvent, StoreError> {
    let id: i64 = row.get(0).map_err(query_error)?;
    let stamp: String = row.get(1).map_err(query_error)?;
    Ok(LogEvent {
        id,
        draft: EventDraft {
            timestamp: parse_timestamp(target, id, &stamp)?,
            kind: row.get(2).map_err(query_error)?,
            contest_code: row.get(3).map_err(query_error)?,
            category: row.get(4).map_err(query_error)?,
            message: row.get(5).map_err(query_error)?,
            hash: row.get(6).map_err(query_error)?,
            source_file: row.get(8).map_err(query_error)?,
        },
    })
}

fn parse_timestamp(target: &TargetTable, id: i64, stamp: &str) -> Result<NaiveDateTime, StoreError> {
    NaiveDateTime::parse_from_str(stamp, DATE_TIME_FORMAT).map_err(|e| StoreError::CorruptRow {
        table: target.table_name(),
        id,
        reason: format!("data_hora '{stamp}': {e}"),
    })
}

fn query_error(e: rusqlite::Error) -> StoreError {
    StoreError::Query(e.to_string())
}

fn schema_error(target: &TargetTable, e: rusqlite::Error) -> StoreError {
    StoreError::Schema {
        table: target.table_name(),
        reason: e.to_string(),
    }
}

fn write_error(target: &TargetTable, e: rusqlite::Error) -> StoreError {
    StoreError::Write {
        table: target.table_name(),
        reason: e.to_string(),
    }
}

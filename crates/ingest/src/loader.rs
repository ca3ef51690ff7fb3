//! 적재 단계 -- 이벤트를 배치로 묶어 저장소에 삽입합니다.
//!
//! [`Loader::begin`]이 대상 테이블을 파괴적으로 다시 만들기 때문에
//! 같은 (UF, 회차)를 다시 처리하면 이전 결과는 완전히 대체됩니다.
//! 저장소 에러는 재시도 없이 그대로 전파됩니다.
//!
//! 진행 로그는 받아들인 이벤트 [`PROGRESS_EVERY_ROWS`]개마다 남기며,
//! 배치 크기와 무관합니다. 아직 커밋되지 않은 행도 포함해 셉니다.

use metrics::counter;
use tracing::{debug, info};
use urnlog_core::metrics as names;
use urnlog_core::pipeline::EventStore;
use urnlog_core::types::{EventDraft, TargetTable};

use crate::config::PROGRESS_EVERY_ROWS;
use crate::error::IngestError;

/// 배치 적재기
pub struct Loader<S> {
    store: S,
    target: TargetTable,
    batch_size: usize,
    batch: Vec<EventDraft>,
    /// 받아들인 이벤트 수 (대기 중인 배치 포함)
    accepted: u64,
    /// 삽입을 마친 행 수
    rows: u64,
}

impl<S: EventStore> Loader<S> {
    /// 대상 테이블을 다시 만들고 적재를 시작합니다.
    pub fn begin(mut store: S, target: TargetTable, batch_size: usize) -> Result<Self, IngestError> {
        let batch_size = batch_size.max(1);
        store.recreate(&target)?;
        info!(table = %target, batch_size, "target table recreated");

        Ok(Self {
            store,
            target,
            batch_size,
            batch: Vec::with_capacity(batch_size),
            accepted: 0,
            rows: 0,
        })
    }

    /// 이벤트를 순서대로 적재합니다. 받아들인 이벤트 수를 반환합니다.
    ///
    /// 마지막 배치는 다음 호출이나 [`finish`](Self::finish)에서 삽입됩니다.
    pub fn load<I>(&mut self, drafts: I) -> Result<u64, IngestError>
    where
        I: IntoIterator<Item = EventDraft>,
    {
        let mut accepted = 0;
        for draft in drafts {
            self.batch.push(draft);
            accepted += 1;
            self.accepted += 1;
            if self.accepted % PROGRESS_EVERY_ROWS == 0 {
                info!(table = %self.target, rows = self.accepted, "load progress");
            }
            if self.batch.len() >= self.batch_size {
                self.flush()?;
            }
        }
        Ok(accepted)
    }

    /// 남은 배치를 삽입하고 저장소와 총 행 수를 돌려줍니다.
    pub fn finish(mut self) -> Result<(S, u64), IngestError> {
        self.flush()?;
        info!(table = %self.target, rows = self.rows, "load finished");
        Ok((self.store, self.rows))
    }

    fn flush(&mut self) -> Result<(), IngestError> {
        if self.batch.is_empty() {
            return Ok(());
        }

        self.store.insert_batch(&self.target, &self.batch)?;
        let inserted = self.batch.len() as u64;
        self.batch.clear();

        self.rows += inserted;
        counter!(names::LOAD_ROWS_INSERTED_TOTAL).increment(inserted);
        debug!(table = %self.target, inserted, "batch committed");
        Ok(())
    }
}

//! 파이프라인 trait — 저장소 경계 정의
//!
//! 수집/분석 크레이트는 구체 저장소를 알지 못하고 이 trait에만 의존합니다.
//!
//! ```text
//! RecordReader --> Loader --(EventStore)--> store --(QueryEngine)--> SequenceDetector
//!                                                                 \-> FrequencyAggregator
//! ```

use crate::error::StoreError;
use crate::types::{EventDraft, GapFrequency, PartitionRow, TargetTable};

/// 적재 대상 저장소
///
/// 적재 단계는 테이블을 파괴적으로 다시 만든 뒤 순서대로 삽입합니다.
/// id는 삽입 순서대로 부여되어야 합니다.
pub trait EventStore {
    /// 대상 테이블과 인덱스를 삭제 후 다시 생성합니다.
    fn recreate(&mut self, target: &TargetTable) -> Result<(), StoreError>;

    /// 이벤트 묶음을 주어진 순서대로 삽입합니다.
    fn insert_batch(&mut self, target: &TargetTable, drafts: &[EventDraft])
    -> Result<(), StoreError>;
}

impl<T: EventStore + ?Sized> EventStore for &mut T {
    fn recreate(&mut self, target: &TargetTable) -> Result<(), StoreError> {
        (**self).recreate(target)
    }

    fn insert_batch(
        &mut self,
        target: &TargetTable,
        drafts: &[EventDraft],
    ) -> Result<(), StoreError> {
        (**self).insert_batch(target, drafts)
    }
}

/// 윈도우 커서 계약
///
/// 투표 확인 행만 대상으로, 원본 파일별로 파티션하고 파티션 내에서는
/// 시각(동률이면 id) 오름차순으로 정렬하여 바로 앞 행의 id와 경과 초를 계산합니다.
///
/// 두 메서드 모두 행을 하나씩 `visit`에 밀어 넣습니다. 구현체는 전체 결과를
/// 메모리에 모으지 않고 스트리밍해야 합니다. `visit`가 에러를 반환하면
/// 즉시 중단하고 그 에러를 그대로 돌려줍니다.
pub trait QueryEngine {
    /// 연쇄 탐지용 커서: `(source_file, timestamp)` 순서.
    ///
    /// 자기 간격이 `[0, max_gap_secs]`이거나 다음 행까지의 간격이 그 범위인
    /// 행만 선택합니다. 자기 간격이 범위를 벗어난 행은 `previous_id`와
    /// `gap_seconds`를 `None`으로 보고하여 연쇄가 끊겼음을 알립니다.
    fn scan_vote_chains<E, F>(
        &self,
        target: &TargetTable,
        max_gap_secs: u32,
        visit: F,
    ) -> Result<(), E>
    where
        E: From<StoreError>,
        F: FnMut(PartitionRow) -> Result<(), E>;

    /// 빈도 집계용 커서: 간격 값별 행 수, 간격 오름차순 (`None`이 먼저).
    fn scan_gap_frequencies<E, F>(&self, target: &TargetTable, visit: F) -> Result<(), E>
    where
        E: From<StoreError>,
        F: FnMut(GapFrequency) -> Result<(), E>;
}

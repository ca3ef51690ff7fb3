//! 라인 진단 싱크
//!
//! 디코딩/파싱에 실패한 라인은 파일 처리를 멈추지 않고 여기에 기록됩니다.
//! 운영에서는 [`TracingDiagnostics`]가 `error!` 로그로 남기고,
//! 테스트에서는 [`MemoryDiagnostics`]로 실패 내역을 검사합니다.

use std::path::PathBuf;

use tracing::error;

/// 버려진 라인 하나의 진단 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    /// 로그 파일 경로
    pub file: PathBuf,
    /// 1부터 시작하는 라인 번호
    pub line: u64,
    /// 탭으로 나눈 원시 필드 (손실 변환된 텍스트)
    pub fields: Vec<String>,
    /// 실패 사유
    pub reason: String,
}

/// 라인 실패 기록 대상
pub trait DiagnosticsSink {
    /// 실패 하나를 기록합니다.
    fn record(&mut self, failure: LineFailure);
}

impl<T: DiagnosticsSink + ?Sized> DiagnosticsSink for &mut T {
    fn record(&mut self, failure: LineFailure) {
        (**self).record(failure);
    }
}

/// tracing `error!` 이벤트로 실패를 남기는 싱크
#[derive(Debug, Default)]
pub struct TracingDiagnostics {
    recorded: u64,
}

impl TracingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 지금까지 기록한 실패 수
    pub fn recorded(&self) -> u64 {
        self.recorded
    }
}

impl DiagnosticsSink for TracingDiagnostics {
    fn record(&mut self, failure: LineFailure) {
        self.recorded += 1;
        error!(
            file = %failure.file.display(),
            line = failure.line,
            fields = ?failure.fields,
            reason = %failure.reason,
            "failed to decode log line, skipping"
        );
    }
}

/// 실패를 메모리에 모으는 싱크
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    pub failures: Vec<LineFailure>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticsSink for MemoryDiagnostics {
    fn record(&mut self, failure: LineFailure) {
        self.failures.push(failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(line: u64) -> LineFailure {
        LineFailure {
            file: PathBuf::from("logd.dat"),
            line,
            fields: vec!["x".to_owned()],
            reason: "bad".to_owned(),
        }
    }

    #[test]
    fn tracing_sink_counts_records() {
        let mut sink = TracingDiagnostics::new();
        sink.record(failure(1));
        sink.record(failure(2));
        assert_eq!(sink.recorded(), 2);
    }

    #[test]
    fn mutable_reference_forwards_to_sink() {
        fn feed<S: DiagnosticsSink>(mut sink: S) {
            sink.record(failure(7));
        }

        let mut memory = MemoryDiagnostics::new();
        feed(&mut memory);
        assert_eq!(memory.failures.len(), 1);
        assert_eq!(memory.failures[0].line, 7);
    }
}

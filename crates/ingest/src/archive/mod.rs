//! 중첩 아카이브 워커 -- 압축 컨테이너를 재귀적으로 풀어 원시 로그 파일을 내놓습니다.
//!
//! # 엔트리 분류
//! - [`EntryKind::LeafData`]: 원시 로그 (`.dat`), 그대로 내보냄
//! - [`EntryKind::NestedContainer`]: 그 밖의 모든 엔트리, 풀어서 재귀
//! - [`EntryKind::Ignored`]: 보고서/이미지/서명 등, 추출하지 않음
//!
//! # 실패 격리
//! 컨테이너를 열 수 없거나 형식이 잘못되었으면 그 하위 트리만 버리고
//! 형제 컨테이너는 계속 처리합니다. 루트 아카이브만 예외로, 열리지 않으면
//! [`ArchiveWalker::open`]이 에러를 반환합니다.
//!
//! # 사용 예시
//! ```ignore
//! use urnlog_ingest::archive::ArchiveWalker;
//!
//! let walker = ArchiveWalker::open("storage/zips/SP.zip", "storage/tmp/SP", &config)?;
//! for leaf in walker {
//!     println!("{} -> {}", leaf.origin, leaf.path.display());
//! }
//! ```

pub mod container;
pub mod scratch;

pub use container::{ContainerFormat, ExtractedEntry, Extraction};
pub use scratch::ScratchDir;

use std::path::{Path, PathBuf};

use metrics::counter;
use tracing::{debug, info, warn};
use urnlog_core::metrics as names;

use crate::config::IngestConfig;
use crate::error::IngestError;

/// 컨테이너 엔트리의 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// 원시 로그 파일
    LeafData,
    /// 다시 풀어야 하는 컨테이너
    NestedContainer,
    /// 분석과 무관한 산출물
    Ignored,
}

impl EntryKind {
    /// 엔트리 이름의 확장자로 종류를 정합니다 (대소문자 무시).
    pub fn classify(name: &str, config: &IngestConfig) -> Self {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        if extension.eq_ignore_ascii_case(&config.leaf_extension) {
            Self::LeafData
        } else if config
            .ignored_extensions
            .iter()
            .any(|ignored| extension.eq_ignore_ascii_case(ignored))
        {
            Self::Ignored
        } else {
            Self::NestedContainer
        }
    }
}

/// 추출된 원시 로그 파일
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafLog {
    /// 로그를 직접 담고 있던 컨테이너의 파일 이름 (파티션 키)
    pub origin: String,
    /// 추출된 파일 경로
    pub path: PathBuf,
}

/// 워커 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// 열어서 푼 컨테이너 수 (루트 포함)
    pub containers_opened: u64,
    /// 열기/추출 실패로 중단된 하위 트리 수
    pub containers_skipped: u64,
    /// 추출하지 않은 엔트리 수
    pub entries_ignored: u64,
    /// 내보낸 원시 로그 수
    pub leaves_yielded: u64,
}

/// 아직 처리하지 않은 트리 노드
#[derive(Debug)]
struct Node {
    kind: EntryKind,
    /// 디스크 위 경로
    path: PathBuf,
    /// 이 노드를 담고 있던 컨테이너의 파일 이름
    parent: String,
}

/// 중첩 아카이브 워커
///
/// 한 번만 순회할 수 있는 지연 이터레이터입니다. 컨테이너는 스택에서 꺼낼 때
/// 풀리며, 원시 로그는 찾는 즉시 내보냅니다. 워커가 drop되면 임시 디렉토리도
/// 함께 삭제되므로, 내보낸 경로는 워커가 살아 있는 동안만 유효합니다.
pub struct ArchiveWalker {
    config: IngestConfig,
    scratch: ScratchDir,
    stack: Vec<Node>,
    stats: WalkStats,
}

impl ArchiveWalker {
    /// 루트 아카이브를 열고 첫 단계를 풉니다.
    ///
    /// 루트 형식을 먼저 확인하고, 열 수 있을 때만 임시 디렉토리를 비우고 만듭니다.
    /// 루트가 없거나 열리지 않으면 [`IngestError::RootArchive`]를 반환하며,
    /// 이때 디스크에는 아무것도 남지 않습니다.
    pub fn open(
        root: impl AsRef<Path>,
        scratch_dir: impl Into<PathBuf>,
        config: &IngestConfig,
    ) -> Result<Self, IngestError> {
        config.validate()?;
        let root = root.as_ref();
        let root_error = |e: IngestError| IngestError::RootArchive {
            path: root.display().to_string(),
            reason: e.to_string(),
        };

        let format = ContainerFormat::sniff(root).map_err(root_error)?;

        let mut walker = Self {
            config: config.clone(),
            scratch: ScratchDir::prepare(scratch_dir)?,
            stack: Vec::new(),
            stats: WalkStats::default(),
        };

        let root_name = file_name_of(root);
        walker.unpack(format, root, &root_name).map_err(root_error)?;

        info!(
            archive = %root.display(),
            pending = walker.stack.len(),
            "root archive opened"
        );
        Ok(walker)
    }

    /// 지금까지의 통계
    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// 컨테이너를 풀고 자식 노드를 스택에 올립니다.
    ///
    /// 컨테이너 자체를 열 수 없으면 `Err`. 엔트리 추출이 중간에 실패하면
    /// 그때까지 꺼낸 엔트리만 올리고 `Ok`를 반환합니다 (경고 로그).
    fn expand(&mut self, container: &Path, container_name: &str) -> Result<(), IngestError> {
        let format = ContainerFormat::sniff(container)?;
        self.unpack(format, container, container_name)
    }

    fn unpack(
        &mut self,
        format: ContainerFormat,
        container: &Path,
        container_name: &str,
    ) -> Result<(), IngestError> {
        let dest = self.scratch.allocate()?;

        let config = &self.config;
        let extraction = container::extract(format, container, &dest, &|name: &str| {
            EntryKind::classify(name, config) == EntryKind::Ignored
        })?;

        self.stats.containers_opened += 1;
        self.stats.entries_ignored += extraction.skipped as u64;
        counter!(names::INGEST_CONTAINERS_OPENED_TOTAL, names::LABEL_FORMAT => format.label())
            .increment(1);

        if let Some(failure) = &extraction.failure {
            self.stats.containers_skipped += 1;
            counter!(names::INGEST_CONTAINERS_SKIPPED_TOTAL).increment(1);
            warn!(
                container = %container.display(),
                extracted = extraction.entries.len(),
                error = %failure,
                "entry extraction failed, skipping rest of container"
            );
        }

        debug!(
            container = %container.display(),
            format = format.label(),
            entries = extraction.entries.len(),
            ignored = extraction.skipped,
            "container expanded"
        );

        // 역순으로 쌓아야 컨테이너 내 순서대로 꺼내짐
        for entry in extraction.entries.into_iter().rev() {
            self.stack.push(Node {
                kind: EntryKind::classify(&entry.name, &self.config),
                path: entry.path,
                parent: container_name.to_owned(),
            });
        }

        Ok(())
    }
}

impl Iterator for ArchiveWalker {
    type Item = LeafLog;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match node.kind {
                EntryKind::LeafData => {
                    self.stats.leaves_yielded += 1;
                    counter!(names::INGEST_LEAVES_EXTRACTED_TOTAL).increment(1);
                    return Some(LeafLog {
                        origin: node.parent,
                        path: node.path,
                    });
                }
                EntryKind::NestedContainer => {
                    let name = file_name_of(&node.path);
                    if let Err(e) = self.expand(&node.path, &name) {
                        self.stats.containers_skipped += 1;
                        counter!(names::INGEST_CONTAINERS_SKIPPED_TOTAL).increment(1);
                        warn!(
                            container = %node.path.display(),
                            parent = %node.parent,
                            error = %e,
                            "container could not be opened, skipping subtree"
                        );
                    }
                    // 풀고 난 컨테이너 파일은 더 필요 없음
                    if let Err(e) = std::fs::remove_file(&node.path) {
                        debug!(path = %node.path.display(), error = %e, "failed to remove expanded container");
                    }
                }
                EntryKind::Ignored => {}
            }
        }
        None
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

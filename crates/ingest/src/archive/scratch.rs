//! 실행 단위 임시 추출 디렉토리
//!
//! 시작 시 비우고, 값이 drop되면 결과와 무관하게 삭제합니다.
//! 만들면서 새로 생긴 상위 디렉토리도 비어 있으면 함께 지웁니다.
//! 같은 UF를 동시에 처리하는 두 실행은 이 디렉토리를 두고 경합합니다 (미처리 제약).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::IngestError;

/// 한 실행이 독점하는 추출 디렉토리
#[derive(Debug)]
pub struct ScratchDir {
    root: PathBuf,
    /// `prepare`가 새로 만든 상위 디렉토리 (깊은 것부터)
    created_parents: Vec<PathBuf>,
    next_slot: usize,
}

impl ScratchDir {
    /// 디렉토리를 비우고 새로 만듭니다.
    pub fn prepare(root: impl Into<PathBuf>) -> Result<Self, IngestError> {
        let root = root.into();

        if root.exists() {
            fs::remove_dir_all(&root).map_err(|e| scratch_error(&root, e))?;
        }

        let created_parents: Vec<PathBuf> = root
            .ancestors()
            .skip(1)
            .take_while(|p| !p.as_os_str().is_empty() && !p.exists())
            .map(Path::to_path_buf)
            .collect();
        fs::create_dir_all(&root).map_err(|e| scratch_error(&root, e))?;

        debug!(
            path = %root.display(),
            created_parents = created_parents.len(),
            "scratch directory prepared"
        );
        Ok(Self {
            root,
            created_parents,
            next_slot: 0,
        })
    }

    /// 디렉토리 경로
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// 컨테이너 하나를 풀 새 하위 디렉토리를 만듭니다.
    ///
    /// 형제 컨테이너의 같은 이름 엔트리끼리 덮어쓰지 않도록 컨테이너마다 따로 둡니다.
    pub fn allocate(&mut self) -> Result<PathBuf, IngestError> {
        let slot = self.root.join(format!("{:06}", self.next_slot));
        self.next_slot += 1;
        fs::create_dir_all(&slot).map_err(|e| scratch_error(&slot, e))?;
        Ok(slot)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => debug!(path = %self.root.display(), "scratch directory removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.root.display(),
                error = %e,
                "failed to remove scratch directory"
            ),
        }

        for parent in &self.created_parents {
            // 다른 내용이 생긴 상위 디렉토리는 남김
            if fs::remove_dir(parent).is_err() {
                break;
            }
        }
    }
}

fn scratch_error(path: &Path, e: std::io::Error) -> IngestError {
    IngestError::Scratch {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_clears_previous_contents() {
        let base = tempfile::tempdir().unwrap();
        let root = base.path().join("SP");
        fs::create_dir_all(root.join("stale")).unwrap();
        fs::write(root.join("stale/old.dat"), b"x").unwrap();

        let scratch = ScratchDir::prepare(&root).unwrap();
        assert!(scratch.path().exists());
        assert!(!root.join("stale").exists());
    }

    #[test]
    fn drop_removes_directory() {
        let base = tempfile::tempdir().unwrap();
        let root = base.path().join("SP");
        {
            let mut scratch = ScratchDir::prepare(&root).unwrap();
            let slot = scratch.allocate().unwrap();
            fs::write(slot.join("a.dat"), b"x").unwrap();
        }
        assert!(!root.exists());
    }

    #[test]
    fn drop_removes_parents_it_created() {
        let base = tempfile::tempdir().unwrap();
        {
            let _scratch = ScratchDir::prepare(base.path().join("tmp/SP")).unwrap();
            assert!(base.path().join("tmp/SP").is_dir());
        }
        assert!(!base.path().join("tmp").exists());
        assert!(base.path().exists());
    }

    #[test]
    fn drop_keeps_parents_that_existed_or_gained_content() {
        let base = tempfile::tempdir().unwrap();
        fs::create_dir(base.path().join("tmp")).unwrap();
        {
            let _scratch = ScratchDir::prepare(base.path().join("tmp/SP")).unwrap();
        }
        assert!(base.path().join("tmp").is_dir());

        {
            let _scratch = ScratchDir::prepare(base.path().join("work/tmp/RJ")).unwrap();
            fs::write(base.path().join("work/keep.txt"), b"x").unwrap();
        }
        assert!(!base.path().join("work/tmp").exists());
        assert!(base.path().join("work/keep.txt").exists());
    }

    #[test]
    fn allocate_returns_distinct_slots() {
        let base = tempfile::tempdir().unwrap();
        let mut scratch = ScratchDir::prepare(base.path().join("RJ")).unwrap();
        let a = scratch.allocate().unwrap();
        let b = scratch.allocate().unwrap();
        assert_ne!(a, b);
        assert!(a.is_dir() && b.is_dir());
    }
}

//! 컨테이너 형식 판별과 추출
//!
//! 확장자가 아니라 매직 바이트로 형식을 판별합니다.
//! - zip: `PK\x03\x04` (빈 아카이브 `PK\x05\x06` 포함)
//! - 7z: `7z\xBC\xAF\x27\x1C` (투표기 `.logjez`)

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path, PathBuf};

use sevenz_rust::{Password, SevenZReader};
use zip::ZipArchive;

use crate::error::IngestError;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";
const SEVEN_Z_MAGIC: &[u8] = b"7z\xBC\xAF\x27\x1C";

/// 지원하는 컨테이너 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    Zip,
    SevenZ,
}

impl ContainerFormat {
    /// 파일 앞부분의 시그니처로 형식을 판별합니다.
    pub fn sniff(path: &Path) -> Result<Self, IngestError> {
        let mut header = [0u8; 6];
        let mut file = File::open(path).map_err(|e| open_error(path, e))?;
        let read = read_up_to(&mut file, &mut header).map_err(|e| open_error(path, e))?;
        let header = &header[..read];

        if header.starts_with(ZIP_MAGIC) || header.starts_with(ZIP_EMPTY_MAGIC) {
            Ok(Self::Zip)
        } else if header.starts_with(SEVEN_Z_MAGIC) {
            Ok(Self::SevenZ)
        } else {
            Err(IngestError::ContainerFormat {
                path: path.display().to_string(),
            })
        }
    }

    /// 메트릭 레이블 값
    pub fn label(&self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::SevenZ => "7z",
        }
    }
}

/// 컨테이너에서 꺼낸 엔트리
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedEntry {
    /// 컨테이너 내 엔트리 이름
    pub name: String,
    /// 디스크 위 추출 경로
    pub path: PathBuf,
}

/// 컨테이너 하나의 추출 결과
///
/// 엔트리 추출이 중간에 실패하면 그때까지 꺼낸 엔트리는 유지하고
/// 나머지 엔트리는 건너뛴 채 `failure`에 사유를 남깁니다.
#[derive(Debug, Default)]
pub struct Extraction {
    /// 성공적으로 꺼낸 엔트리 (컨테이너 내 순서)
    pub entries: Vec<ExtractedEntry>,
    /// 추출하지 않고 건너뛴 엔트리 수
    pub skipped: usize,
    /// 하위 트리를 중단시킨 실패
    pub failure: Option<IngestError>,
}

/// 컨테이너를 `dest` 아래로 풉니다.
///
/// `skip`이 `true`를 돌려주는 엔트리는 디스크에 쓰지 않습니다.
/// 컨테이너 자체를 열 수 없으면 `Err`를 반환합니다.
pub fn extract(
    format: ContainerFormat,
    container: &Path,
    dest: &Path,
    skip: &dyn Fn(&str) -> bool,
) -> Result<Extraction, IngestError> {
    match format {
        ContainerFormat::Zip => extract_zip(container, dest, skip),
        ContainerFormat::SevenZ => extract_7z(container, dest, skip),
    }
}

fn extract_zip(
    container: &Path,
    dest: &Path,
    skip: &dyn Fn(&str) -> bool,
) -> Result<Extraction, IngestError> {
    let file = File::open(container).map_err(|e| open_error(container, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(|e| IngestError::ContainerOpen {
        path: container.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut extraction = Extraction::default();

    for index in 0..archive.len() {
        let mut entry = match archive.by_index(index) {
            Ok(entry) => entry,
            Err(e) => {
                extraction.failure = Some(IngestError::EntryExtract {
                    container: container.display().to_string(),
                    entry: format!("#{index}"),
                    reason: e.to_string(),
                });
                break;
            }
        };

        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_owned();
        if skip(&name) {
            extraction.skipped += 1;
            continue;
        }

        match write_entry(container, &name, dest, &mut entry) {
            Ok(path) => extraction.entries.push(ExtractedEntry { name, path }),
            Err(e) => {
                extraction.failure = Some(e);
                break;
            }
        }
    }

    Ok(extraction)
}

fn extract_7z(
    container: &Path,
    dest: &Path,
    skip: &dyn Fn(&str) -> bool,
) -> Result<Extraction, IngestError> {
    let mut archive =
        SevenZReader::open(container, Password::empty()).map_err(|e| IngestError::ContainerOpen {
            path: container.display().to_string(),
            reason: e.to_string(),
        })?;

    let mut extraction = Extraction::default();
    let mut failure = None;

    let walked = archive.for_each_entries(|entry, data| {
        if entry.is_directory() {
            return Ok(true);
        }

        let name = entry.name().to_owned();
        if skip(&name) {
            extraction.skipped += 1;
            // 솔리드 블록이므로 다음 엔트리로 가려면 데이터를 소비해야 함
            io::copy(data, &mut io::sink())?;
            return Ok(true);
        }

        match write_entry(container, &name, dest, data) {
            Ok(path) => {
                extraction.entries.push(ExtractedEntry { name, path });
                Ok(true)
            }
            Err(e) => {
                failure = Some(e);
                Ok(false)
            }
        }
    });

    if let Err(e) = walked {
        failure.get_or_insert(IngestError::EntryExtract {
            container: container.display().to_string(),
            entry: extraction
                .entries
                .last()
                .map(|last| format!("after {}", last.name))
                .unwrap_or_else(|| "#0".to_owned()),
            reason: e.to_string(),
        });
    }

    extraction.failure = failure;
    Ok(extraction)
}

/// 엔트리 하나를 디스크에 씁니다. 실패하면 일부만 쓰인 파일을 지웁니다.
fn write_entry(
    container: &Path,
    name: &str,
    dest: &Path,
    data: &mut dyn Read,
) -> Result<PathBuf, IngestError> {
    let relative = safe_relative_path(name).ok_or_else(|| IngestError::UnsafeEntryName {
        container: container.display().to_string(),
        entry: name.to_owned(),
    })?;
    let target = dest.join(relative);

    let written = (|| -> io::Result<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(data, &mut out)?;
        out.sync_all()
    })();

    match written {
        Ok(()) => Ok(target),
        Err(e) => {
            let _ = fs::remove_file(&target);
            Err(IngestError::EntryExtract {
                container: container.display().to_string(),
                entry: name.to_owned(),
                reason: e.to_string(),
            })
        }
    }
}

/// 엔트리 이름을 추출 디렉토리 기준 상대 경로로 바꿉니다.
///
/// 절대 경로, `..`, 드라이브 접두어가 있으면 `None`.
pub fn safe_relative_path(name: &str) -> Option<PathBuf> {
    let normalized = name.replace('\\', "/");
    let path = Path::new(&normalized);
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

fn open_error(path: &Path, e: io::Error) -> IngestError {
    IngestError::ContainerOpen {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

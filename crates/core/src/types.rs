//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 모든 크레이트가 공유하는 데이터 구조를 정의합니다.
//! 수집(ingest), 저장소(store), 분석(analysis) 단계는 이 타입들로 데이터를 교환합니다.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// 투표 확인 이벤트의 분류 값
pub const VOTE_CATEGORY: &str = "VOTA";

/// 투표 확인 이벤트의 메시지 (정확히 일치해야 함)
pub const VOTE_MESSAGE: &str = "O voto do eleitor foi computado";

/// 저장소와 출력 파일에서 사용하는 일시 형식
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 분류와 메시지가 함께 "투표가 기록되었음"을 뜻하는지 판정합니다.
///
/// 대소문자를 구분하며, 파서가 이미 적용한 trim 외의 정규화는 하지 않습니다.
pub fn is_vote_confirmed(category: &str, message: &str) -> bool {
    category == VOTE_CATEGORY && message == VOTE_MESSAGE
}

/// 연방 단위 (UF)
///
/// 27개 주/연방구와 해외 투표(`ZZ`)를 포함합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Region {
    Ac,
    Al,
    Am,
    Ap,
    Ba,
    Ce,
    Df,
    Es,
    Go,
    Ma,
    Mg,
    Ms,
    Mt,
    Pa,
    Pb,
    Pe,
    Pi,
    Pr,
    Rj,
    Rn,
    Ro,
    Rr,
    Rs,
    Sc,
    Se,
    Sp,
    To,
    Zz,
}

impl Region {
    /// 전체 UF 목록
    pub const ALL: [Region; 28] = [
        Region::Ac,
        Region::Al,
        Region::Am,
        Region::Ap,
        Region::Ba,
        Region::Ce,
        Region::Df,
        Region::Es,
        Region::Go,
        Region::Ma,
        Region::Mg,
        Region::Ms,
        Region::Mt,
        Region::Pa,
        Region::Pb,
        Region::Pe,
        Region::Pi,
        Region::Pr,
        Region::Rj,
        Region::Rn,
        Region::Ro,
        Region::Rr,
        Region::Rs,
        Region::Sc,
        Region::Se,
        Region::Sp,
        Region::To,
        Region::Zz,
    ];

    /// 대문자 두 글자 코드 (예: "SP")
    pub fn code(&self) -> &'static str {
        match self {
            Region::Ac => "AC",
            Region::Al => "AL",
            Region::Am => "AM",
            Region::Ap => "AP",
            Region::Ba => "BA",
            Region::Ce => "CE",
            Region::Df => "DF",
            Region::Es => "ES",
            Region::Go => "GO",
            Region::Ma => "MA",
            Region::Mg => "MG",
            Region::Ms => "MS",
            Region::Mt => "MT",
            Region::Pa => "PA",
            Region::Pb => "PB",
            Region::Pe => "PE",
            Region::Pi => "PI",
            Region::Pr => "PR",
            Region::Rj => "RJ",
            Region::Rn => "RN",
            Region::Ro => "RO",
            Region::Rr => "RR",
            Region::Rs => "RS",
            Region::Sc => "SC",
            Region::Se => "SE",
            Region::Sp => "SP",
            Region::To => "TO",
            Region::Zz => "ZZ",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.code() == wanted)
            .ok_or_else(|| InputError::Region(s.to_owned()))
    }
}

impl TryFrom<String> for Region {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.code().to_owned()
    }
}

/// 선거 회차 (turno)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Round {
    /// 1차 투표
    First,
    /// 결선 투표
    Second,
}

impl Round {
    /// 회차 번호 (1 또는 2)
    pub fn number(&self) -> u8 {
        match self {
            Round::First => 1,
            Round::Second => 2,
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for Round {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Round::First),
            "2" => Ok(Round::Second),
            other => Err(InputError::Round(other.to_owned())),
        }
    }
}

/// (UF, 회차)별 적재 대상 테이블
///
/// 테이블/인덱스 이름은 이 값에서만 만들어집니다.
/// `Region`과 `Round`가 닫힌 열거형이므로 이름에 임의 문자열이 들어갈 수 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetTable {
    pub region: Region,
    pub round: Round,
}

impl TargetTable {
    pub fn new(region: Region, round: Round) -> Self {
        Self { region, round }
    }

    /// 예: `logs_sp_1t`
    pub fn table_name(&self) -> String {
        format!(
            "logs_{}_{}t",
            self.region.code().to_ascii_lowercase(),
            self.round.number()
        )
    }

    /// 예: `logs_sp_1t_index`
    pub fn index_name(&self) -> String {
        format!("{}_index", self.table_name())
    }
}

impl fmt::Display for TargetTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.table_name())
    }
}

/// 파싱을 마친, 아직 id가 없는 로그 이벤트
///
/// 파서가 생성하고 적재 단계가 소비합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    /// 이벤트 일시 (`data_hora`)
    pub timestamp: NaiveDateTime,
    /// 이벤트 유형 (`tipo`, 예: INFO, ERRO)
    pub kind: String,
    /// 선거 코드 (`pleito`)
    pub contest_code: String,
    /// 이벤트 분류 (`evento`, 예: VOTA, GAP)
    pub category: String,
    /// 메시지 (`mensagem`)
    pub message: String,
    /// 무결성 해시 (있을 경우)
    pub hash: Option<String>,
    /// 원본 로그 아카이브 이름 (`arquivo`), 파티션 키
    pub source_file: String,
}

impl EventDraft {
    pub fn new(
        timestamp: NaiveDateTime,
        kind: impl Into<String>,
        contest_code: impl Into<String>,
        category: impl Into<String>,
        message: impl Into<String>,
        hash: Option<String>,
        source_file: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            kind: kind.into(),
            contest_code: contest_code.into(),
            category: category.into(),
            message: message.into(),
            hash,
            source_file: source_file.into(),
        }
    }

    /// 투표 확인 여부 (`voto_computado`)
    ///
    /// 저장하지 않고 분류와 메시지에서 매번 계산하므로 두 필드와 어긋날 수 없습니다.
    pub fn vote_confirmed(&self) -> bool {
        is_vote_confirmed(&self.category, &self.message)
    }
}

/// 저장소에 적재된 로그 이벤트 (삽입 순서로 id 부여)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub id: i64,
    #[serde(flatten)]
    pub draft: EventDraft,
}

/// 파티션(원본 파일) 내 시간 순으로 정렬된 투표 확인 행
///
/// 쿼리 엔진이 계산하는 파생 값이며 저장되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionRow {
    pub id: i64,
    pub source_file: String,
    pub timestamp: NaiveDateTime,
    /// 같은 파티션에서 바로 앞 행의 id
    pub previous_id: Option<i64>,
    /// 바로 앞 행 이후 경과한 초
    pub gap_seconds: Option<i64>,
}

/// 간격 값별 발생 횟수 (쿼리 엔진이 집계)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GapFrequency {
    /// 간격(초). 파티션의 첫 행이면 `None`
    pub gap_seconds: Option<i64>,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 10, 2)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .unwrap()
    }

    #[test]
    fn region_parses_case_insensitively() {
        assert_eq!("sp".parse::<Region>().unwrap(), Region::Sp);
        assert_eq!("ZZ".parse::<Region>().unwrap(), Region::Zz);
        assert_eq!(" df ".parse::<Region>().unwrap(), Region::Df);
    }

    #[test]
    fn region_rejects_unknown_code() {
        let err = "XX".parse::<Region>().unwrap_err();
        assert_eq!(err, InputError::Region("XX".to_owned()));
    }

    #[test]
    fn every_region_roundtrips_through_its_code() {
        for region in Region::ALL {
            assert_eq!(region.code().parse::<Region>().unwrap(), region);
        }
    }

    #[test]
    fn round_only_accepts_one_or_two() {
        assert_eq!("1".parse::<Round>().unwrap(), Round::First);
        assert_eq!("2".parse::<Round>().unwrap(), Round::Second);
        assert!("0".parse::<Round>().is_err());
        assert!("3".parse::<Round>().is_err());
        assert!("primeiro".parse::<Round>().is_err());
    }

    #[test]
    fn target_table_names() {
        let target = TargetTable::new(Region::Mg, Round::Second);
        assert_eq!(target.table_name(), "logs_mg_2t");
        assert_eq!(target.index_name(), "logs_mg_2t_index");
    }

    #[test]
    fn draft_flags_confirmed_vote() {
        let draft = EventDraft::new(
            at(10, 0, 0),
            "INFO",
            "00407",
            "VOTA",
            "O voto do eleitor foi computado",
            None,
            "a.logjez",
        );
        assert!(draft.vote_confirmed());
    }

    #[test]
    fn draft_vote_flag_is_case_sensitive() {
        let draft = EventDraft::new(
            at(10, 0, 0),
            "INFO",
            "00407",
            "vota",
            "O voto do eleitor foi computado",
            None,
            "a.logjez",
        );
        assert!(!draft.vote_confirmed());

        let draft = EventDraft::new(
            at(10, 0, 0),
            "INFO",
            "00407",
            "VOTA",
            "O voto do eleitor foi computado.",
            None,
            "a.logjez",
        );
        assert!(!draft.vote_confirmed());
    }

    #[test]
    fn vote_flag_follows_edited_fields() {
        let mut draft = EventDraft::new(
            at(10, 0, 0),
            "INFO",
            "00407",
            "VOTA",
            "O voto do eleitor foi computado",
            None,
            "a.logjez",
        );
        draft.message = "Eleitor cancelado".to_owned();
        assert!(!draft.vote_confirmed());

        let json = r#"{"timestamp":"2022-10-02T10:00:00","kind":"INFO","contest_code":"00407",
            "category":"GAP","message":"O voto do eleitor foi computado","hash":null,
            "vote_confirmed":true,"source_file":"a.logjez"}"#;
        let draft: EventDraft = serde_json::from_str(json).unwrap();
        assert!(!draft.vote_confirmed());
    }
}

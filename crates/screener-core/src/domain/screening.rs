//! 조건 판정 및 스크리닝 결과.
//!
//! 이 모듈은 조건 평가의 출력 타입을 정의합니다:
//! - `ConditionKey` - 스크리닝 조건 식별자 (전체 카탈로그)
//! - `ConditionVerdict` - 조건별 통과 여부 + 표시용 값
//! - `Grade` - 점수 구간별 등급
//! - `ScreeningResult` - 한 종목의 평가/점수 결과
//! - `ScreeningRunReport` - 배치 실행 전체 결과

use crate::types::InstrumentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 스크리닝 조건 식별자.
///
/// BTreeMap 키로 사용되므로 정렬 순서가 판정 맵의 순회 순서를 결정하며,
/// 같은 입력에 대해 항상 동일한 결과가 나오도록 보장합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKey {
    /// 상장(TWSE) 시장 종목
    MarketTwse,
    /// 장외(OTC) 시장 종목
    MarketOtc,
    /// 거래량 급증 (5일 평균 대비)
    VolumeSurge5d,
    /// 거래량 급증 (20일 평균 대비)
    VolumeSurge20d,
    /// 거래량 급증 (60일 평균 대비)
    VolumeSurge60d,
    /// 최저 거래량
    MinVolume,
    /// 일간 KD 골든크로스
    DailyKdGolden,
    /// 월간(20일) KD 골든크로스
    MonthlyKdGolden,
    /// 종가가 MA20 위
    AboveMa20,
    /// 60일 신고가 돌파
    Break60dHigh,
    /// 투신 당일 순매수
    TrustBuy,
    /// 투신 지분율 하한
    TrustPct,
    /// 투신 5일 누적 순매수
    Trust5d,
    /// 투신 지분율 상한
    TrustHolding,
    /// 3대 법인 5일 누적 순매수
    Inst5d,
    /// 융자 사용률 상한
    MarginRatio,
    /// 융자 5일 증감
    Margin5d,
    /// EPS 하한
    Eps,
    /// ROE 하한
    Roe,
    /// 배당수익률 하한
    DividendYield,
    /// 일간 등락률 상한
    DailyChange,
    /// 5일 누적 등락률 상한
    Change5d,
    /// 경고 종목 제외
    NotWarning,
    /// 처치 종목 제외
    NotDisposition,
    /// 연속 상한가 제외
    NotLimitUp,
}

impl ConditionKey {
    /// 전체 조건 카탈로그를 정렬 순서대로 반환합니다.
    pub fn all() -> &'static [ConditionKey] {
        use ConditionKey::*;
        &[
            MarketTwse,
            MarketOtc,
            VolumeSurge5d,
            VolumeSurge20d,
            VolumeSurge60d,
            MinVolume,
            DailyKdGolden,
            MonthlyKdGolden,
            AboveMa20,
            Break60dHigh,
            TrustBuy,
            TrustPct,
            Trust5d,
            TrustHolding,
            Inst5d,
            MarginRatio,
            Margin5d,
            Eps,
            Roe,
            DividendYield,
            DailyChange,
            Change5d,
            NotWarning,
            NotDisposition,
            NotLimitUp,
        ]
    }
}

impl fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConditionKey::MarketTwse => "market_twse",
            ConditionKey::MarketOtc => "market_otc",
            ConditionKey::VolumeSurge5d => "volume_surge_5d",
            ConditionKey::VolumeSurge20d => "volume_surge_20d",
            ConditionKey::VolumeSurge60d => "volume_surge_60d",
            ConditionKey::MinVolume => "min_volume",
            ConditionKey::DailyKdGolden => "daily_kd_golden",
            ConditionKey::MonthlyKdGolden => "monthly_kd_golden",
            ConditionKey::AboveMa20 => "above_ma20",
            ConditionKey::Break60dHigh => "break_60d_high",
            ConditionKey::TrustBuy => "trust_buy",
            ConditionKey::TrustPct => "trust_pct",
            ConditionKey::Trust5d => "trust_5d",
            ConditionKey::TrustHolding => "trust_holding",
            ConditionKey::Inst5d => "inst_5d",
            ConditionKey::MarginRatio => "margin_ratio",
            ConditionKey::Margin5d => "margin_5d",
            ConditionKey::Eps => "eps",
            ConditionKey::Roe => "roe",
            ConditionKey::DividendYield => "dividend_yield",
            ConditionKey::DailyChange => "daily_change",
            ConditionKey::Change5d => "change_5d",
            ConditionKey::NotWarning => "not_warning",
            ConditionKey::NotDisposition => "not_disposition",
            ConditionKey::NotLimitUp => "not_limit_up",
        };
        write!(f, "{}", name)
    }
}

/// 조건별 판정.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionVerdict {
    /// 통과 여부 (데이터 부족으로 판정 불가한 경우 false)
    pub passed: bool,
    /// 사람이 읽을 수 있는 실제 값 문자열 (판정 불가 시 "N/A" 포함)
    pub display_value: String,
}

impl ConditionVerdict {
    /// 새 판정을 생성합니다.
    pub fn new(passed: bool, display_value: impl Into<String>) -> Self {
        Self {
            passed,
            display_value: display_value.into(),
        }
    }
}

/// 점수 구간별 등급.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    /// 60점 미만
    C,
    /// 60점 이상
    B,
    /// 70점 이상
    BPlus,
    /// 80점 이상
    A,
    /// 90점 이상
    APlus,
}

impl Grade {
    /// 총점에서 등급을 산출합니다.
    pub fn from_score(score: u32) -> Self {
        if score >= 90 {
            Grade::APlus
        } else if score >= 80 {
            Grade::A
        } else if score >= 70 {
            Grade::BPlus
        } else if score >= 60 {
            Grade::B
        } else {
            Grade::C
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::APlus => write!(f, "A+"),
            Grade::A => write!(f, "A"),
            Grade::BPlus => write!(f, "B+"),
            Grade::B => write!(f, "B"),
            Grade::C => write!(f, "C"),
        }
    }
}

/// 한 종목의 스크리닝 결과.
///
/// 조건 평가기가 생성하고(점수 필드는 0), 점수 엔진이 점수/등급/신호를
/// 채운 뒤, 오케스트레이터와 리포팅 계층이 읽기 전용으로 소비합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    /// 종목 식별자
    pub instrument_id: InstrumentId,
    /// 통과한 조건 수
    pub matched_count: usize,
    /// 통과 기준(min_conditions_to_pass) 충족 여부
    pub passed: bool,
    /// 조건별 판정 (활성화된 조건만 포함)
    pub verdicts: BTreeMap<ConditionKey, ConditionVerdict>,
    /// 기본 점수 (가중치 합)
    pub base_score: u32,
    /// 조합 가산점
    pub combo_score: u32,
    /// 총점 (100점 상한)
    pub total_score: u32,
    /// 등급
    pub grade: Grade,
    /// 핵심 신호 라벨
    pub signal: String,
}

impl ScreeningResult {
    /// 평가 단계의 결과를 생성합니다 (점수 필드는 점수 엔진이 채움).
    pub fn from_verdicts(
        instrument_id: InstrumentId,
        verdicts: BTreeMap<ConditionKey, ConditionVerdict>,
        min_conditions_to_pass: usize,
    ) -> Self {
        let matched_count = verdicts.values().filter(|v| v.passed).count();
        Self {
            instrument_id,
            matched_count,
            passed: matched_count >= min_conditions_to_pass,
            verdicts,
            base_score: 0,
            combo_score: 0,
            total_score: 0,
            grade: Grade::C,
            signal: String::new(),
        }
    }

    /// 특정 조건의 통과 여부를 반환합니다 (미평가 조건은 false).
    pub fn matched(&self, key: ConditionKey) -> bool {
        self.verdicts.get(&key).map(|v| v.passed).unwrap_or(false)
    }
}

/// 배치 스크리닝 실행 결과.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreeningRunReport {
    /// 총점 내림차순으로 정렬된 결과
    pub results: Vec<ScreeningResult>,
    /// 처리 완료된 종목 수
    pub instruments_processed: usize,
    /// 처리 실패(스킵)된 종목 수
    pub instruments_failed: usize,
    /// 스칼라 메트릭 1개 이상이 기본값으로 폴백한 종목 수
    pub instruments_with_defaults: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_ladder() {
        assert_eq!(Grade::from_score(95), Grade::APlus);
        assert_eq!(Grade::from_score(90), Grade::APlus);
        assert_eq!(Grade::from_score(89), Grade::A);
        assert_eq!(Grade::from_score(80), Grade::A);
        assert_eq!(Grade::from_score(70), Grade::BPlus);
        assert_eq!(Grade::from_score(60), Grade::B);
        assert_eq!(Grade::from_score(59), Grade::C);
        assert_eq!(Grade::from_score(0), Grade::C);
    }

    #[test]
    fn test_grade_display() {
        assert_eq!(Grade::APlus.to_string(), "A+");
        assert_eq!(Grade::BPlus.to_string(), "B+");
    }

    #[test]
    fn test_from_verdicts_counts_matches() {
        let mut verdicts = BTreeMap::new();
        verdicts.insert(ConditionKey::Eps, ConditionVerdict::new(true, "EPS: 39.20"));
        verdicts.insert(ConditionKey::Roe, ConditionVerdict::new(true, "ROE: 28.50%"));
        verdicts.insert(
            ConditionKey::MinVolume,
            ConditionVerdict::new(false, "volume: 120 lots"),
        );

        let result = ScreeningResult::from_verdicts(InstrumentId::new("2330"), verdicts, 2);
        assert_eq!(result.matched_count, 2);
        assert!(result.passed);
        assert!(result.matched(ConditionKey::Eps));
        assert!(!result.matched(ConditionKey::MinVolume));
        // 평가되지 않은 조건은 false
        assert!(!result.matched(ConditionKey::Break60dHigh));
    }

    #[test]
    fn test_from_verdicts_below_threshold() {
        let mut verdicts = BTreeMap::new();
        verdicts.insert(ConditionKey::Eps, ConditionVerdict::new(true, "EPS: 2.10"));

        let result = ScreeningResult::from_verdicts(InstrumentId::new("2886"), verdicts, 2);
        assert_eq!(result.matched_count, 1);
        assert!(!result.passed);
    }

    #[test]
    fn test_condition_key_catalogue_is_sorted() {
        let all = ConditionKey::all();
        assert_eq!(all.len(), 25);
        let mut sorted = all.to_vec();
        sorted.sort();
        assert_eq!(sorted.as_slice(), all);
    }
}

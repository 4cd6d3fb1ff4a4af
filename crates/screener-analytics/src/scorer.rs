//! 점수 엔진.
//!
//! 통과한 조건의 가중치를 합산하고, 특정 조합이 동시에 성립하면
//! 가산점을 더한 뒤, 총점(100점 상한)에서 등급과 핵심 신호 라벨을
//! 산출합니다.
//!
//! # 가중치 구성
//!
//! - 거래량 (최대 38점): 60일 급증 20, 20일 급증 10, 5일 급증 5, 최저 거래량 3
//! - 기술 지표 (최대 38점): 60일 신고가 15, 일간 KD 10, 월간 KD 8, MA20 5
//! - 법인 수급 (최대 30점): 투신 당일 10, 투신 5일 10, 투신 지분 하한 5, 법인 5일 5
//! - 기본면 (최대 15점): EPS 5, ROE 5, 배당수익률 5
//! - 기타 가점: 등락률 3+3, 융자 2+2, 비경고 2, 비처치 2, 비연속상한 3
//!
//! # 조합 가산점
//!
//! - 거래량 3단계 동시 충족: +10
//! - 기술 2개 이상 + 기본면 2개 이상: +15
//! - 법인 수급 3개 중 2개 이상: +10

use tracing::debug;

use screener_core::{ConditionKey, Grade, ScreeningResult};

/// 조건별 가중치 테이블.
#[derive(Debug, Clone)]
pub struct WeightTable {
    /// 거래량 60일 급증 (극단 폭증)
    pub volume_surge_60d: u32,
    /// 거래량 20일 급증
    pub volume_surge_20d: u32,
    /// 거래량 5일 급증
    pub volume_surge_5d: u32,
    /// 최저 거래량
    pub min_volume: u32,
    /// 일간 KD 골든크로스
    pub daily_kd_golden: u32,
    /// 월간 KD 골든크로스
    pub monthly_kd_golden: u32,
    /// MA20 상회
    pub above_ma20: u32,
    /// 60일 신고가 돌파
    pub break_60d_high: u32,
    /// 투신 당일 순매수
    pub trust_buy: u32,
    /// 투신 지분율 하한
    pub trust_pct: u32,
    /// 투신 5일 누적
    pub trust_5d: u32,
    /// 3대 법인 5일 누적
    pub inst_5d: u32,
    /// EPS
    pub eps: u32,
    /// ROE
    pub roe: u32,
    /// 배당수익률
    pub dividend_yield: u32,
    /// 일간 등락률 적정
    pub daily_change: u32,
    /// 5일 등락률 적정
    pub change_5d: u32,
    /// 융자 사용률 양호
    pub margin_ratio: u32,
    /// 융자 5일 통제
    pub margin_5d: u32,
    /// 비경고 종목
    pub not_warning: u32,
    /// 비처치 종목
    pub not_disposition: u32,
    /// 비연속 상한가
    pub not_limit_up: u32,
    /// 거래량 3단계 동시 충족 가산
    pub combo_perfect_volume: u32,
    /// 기술+기본면 조합 가산
    pub combo_tech_fundamental: u32,
    /// 법인 수급 조합 가산
    pub combo_institutional: u32,
}

impl Default for WeightTable {
    fn default() -> Self {
        Self {
            volume_surge_60d: 20,
            volume_surge_20d: 10,
            volume_surge_5d: 5,
            min_volume: 3,
            daily_kd_golden: 10,
            monthly_kd_golden: 8,
            above_ma20: 5,
            break_60d_high: 15,
            trust_buy: 10,
            trust_pct: 5,
            trust_5d: 10,
            inst_5d: 5,
            eps: 5,
            roe: 5,
            dividend_yield: 5,
            daily_change: 3,
            change_5d: 3,
            margin_ratio: 2,
            margin_5d: 2,
            not_warning: 2,
            not_disposition: 2,
            not_limit_up: 3,
            combo_perfect_volume: 10,
            combo_tech_fundamental: 15,
            combo_institutional: 10,
        }
    }
}

impl WeightTable {
    /// 조건별 가중치를 반환합니다.
    ///
    /// 시장 범위와 투신 지분율 상한은 게이트 역할이라 점수에 기여하지
    /// 않습니다.
    pub fn weight(&self, key: ConditionKey) -> u32 {
        match key {
            ConditionKey::MarketTwse | ConditionKey::MarketOtc | ConditionKey::TrustHolding => 0,
            ConditionKey::VolumeSurge5d => self.volume_surge_5d,
            ConditionKey::VolumeSurge20d => self.volume_surge_20d,
            ConditionKey::VolumeSurge60d => self.volume_surge_60d,
            ConditionKey::MinVolume => self.min_volume,
            ConditionKey::DailyKdGolden => self.daily_kd_golden,
            ConditionKey::MonthlyKdGolden => self.monthly_kd_golden,
            ConditionKey::AboveMa20 => self.above_ma20,
            ConditionKey::Break60dHigh => self.break_60d_high,
            ConditionKey::TrustBuy => self.trust_buy,
            ConditionKey::TrustPct => self.trust_pct,
            ConditionKey::Trust5d => self.trust_5d,
            ConditionKey::Inst5d => self.inst_5d,
            ConditionKey::MarginRatio => self.margin_ratio,
            ConditionKey::Margin5d => self.margin_5d,
            ConditionKey::Eps => self.eps,
            ConditionKey::Roe => self.roe,
            ConditionKey::DividendYield => self.dividend_yield,
            ConditionKey::DailyChange => self.daily_change,
            ConditionKey::Change5d => self.change_5d,
            ConditionKey::NotWarning => self.not_warning,
            ConditionKey::NotDisposition => self.not_disposition,
            ConditionKey::NotLimitUp => self.not_limit_up,
        }
    }
}

/// 관망 라벨 (통과 조건이 없을 때).
const NEUTRAL_SIGNAL: &str = "관망";

/// 점수 엔진.
pub struct ScoringEngine {
    weights: WeightTable,
}

impl ScoringEngine {
    /// 기본 가중치로 점수 엔진을 생성합니다.
    pub fn new() -> Self {
        Self {
            weights: WeightTable::default(),
        }
    }

    /// 커스텀 가중치로 점수 엔진을 생성합니다.
    pub fn with_weights(weights: WeightTable) -> Self {
        Self { weights }
    }

    /// 평가 결과에 점수/등급/신호를 채웁니다.
    pub fn score(&self, result: &mut ScreeningResult) {
        let base_score: u32 = result
            .verdicts
            .iter()
            .filter(|(_, v)| v.passed)
            .map(|(&key, _)| self.weights.weight(key))
            .sum();

        let combo_score = self.combo_bonus(result);
        let total_score = (base_score + combo_score).min(100);

        result.base_score = base_score;
        result.combo_score = combo_score;
        result.total_score = total_score;
        result.grade = Grade::from_score(total_score);
        result.signal = self.key_signal(result);

        debug!(
            instrument = %result.instrument_id,
            base = base_score,
            combo = combo_score,
            total = total_score,
            grade = %result.grade,
            "점수 산출 완료"
        );
    }

    /// 조합 가산점을 계산합니다.
    fn combo_bonus(&self, result: &ScreeningResult) -> u32 {
        let mut bonus = 0;

        // 거래량 3단계 동시 충족
        let volume_tiers = [
            ConditionKey::VolumeSurge5d,
            ConditionKey::VolumeSurge20d,
            ConditionKey::VolumeSurge60d,
        ];
        if volume_tiers.iter().all(|&k| result.matched(k)) {
            bonus += self.weights.combo_perfect_volume;
        }

        // 기술 2개 이상 + 기본면 2개 이상
        let tech = [
            ConditionKey::DailyKdGolden,
            ConditionKey::AboveMa20,
            ConditionKey::Break60dHigh,
        ];
        let fundamental = [
            ConditionKey::Eps,
            ConditionKey::Roe,
            ConditionKey::DividendYield,
        ];
        let tech_count = tech.iter().filter(|&&k| result.matched(k)).count();
        let fund_count = fundamental.iter().filter(|&&k| result.matched(k)).count();
        if tech_count >= 2 && fund_count >= 2 {
            bonus += self.weights.combo_tech_fundamental;
        }

        // 법인 수급 3개 중 2개 이상
        let institutional = [
            ConditionKey::TrustBuy,
            ConditionKey::Trust5d,
            ConditionKey::Inst5d,
        ];
        let inst_count = institutional.iter().filter(|&&k| result.matched(k)).count();
        if inst_count >= 2 {
            bonus += self.weights.combo_institutional;
        }

        bonus
    }

    /// 핵심 신호 라벨을 생성합니다.
    ///
    /// 우선순위가 높은 라벨부터 최대 3개를 " + "로 연결합니다. 거래량
    /// 라벨은 상위 단계 하나만 사용합니다. 통과 조건이 없으면 관망.
    fn key_signal(&self, result: &ScreeningResult) -> String {
        let mut signals: Vec<&str> = Vec::new();

        if result.matched(ConditionKey::VolumeSurge60d) {
            signals.push("거래량 초폭증");
        } else if result.matched(ConditionKey::VolumeSurge20d) {
            signals.push("거래량 폭증");
        } else if result.matched(ConditionKey::VolumeSurge5d) {
            signals.push("거래량 급증");
        }

        if result.matched(ConditionKey::DailyKdGolden) {
            signals.push("KD 골든크로스");
        }

        if result.matched(ConditionKey::Break60dHigh) {
            signals.push("60일 신고가 돌파");
        }

        if result.matched(ConditionKey::TrustBuy) {
            signals.push("투신 순매수");
        }

        if result.matched(ConditionKey::Trust5d) {
            signals.push("투신 연속 매수");
        }

        if result.matched(ConditionKey::Eps) && result.matched(ConditionKey::Roe) {
            signals.push("펀더멘털 우량");
        }

        if signals.is_empty() {
            NEUTRAL_SIGNAL.to_string()
        } else {
            signals[..signals.len().min(3)].join(" + ")
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::{ConditionVerdict, InstrumentId};
    use std::collections::BTreeMap;

    fn result_with(matched: &[ConditionKey]) -> ScreeningResult {
        let mut verdicts = BTreeMap::new();
        for &key in matched {
            verdicts.insert(key, ConditionVerdict::new(true, "ok"));
        }
        ScreeningResult::from_verdicts(InstrumentId::new("2330"), verdicts, 1)
    }

    #[test]
    fn test_base_score_sums_weights() {
        let mut result = result_with(&[
            ConditionKey::VolumeSurge5d,
            ConditionKey::MinVolume,
            ConditionKey::Eps,
        ]);
        ScoringEngine::new().score(&mut result);
        assert_eq!(result.base_score, 5 + 3 + 5);
        assert_eq!(result.combo_score, 0);
        assert_eq!(result.total_score, 13);
        assert_eq!(result.grade, Grade::C);
    }

    #[test]
    fn test_perfect_volume_combo() {
        let mut result = result_with(&[
            ConditionKey::VolumeSurge5d,
            ConditionKey::VolumeSurge20d,
            ConditionKey::VolumeSurge60d,
        ]);
        ScoringEngine::new().score(&mut result);
        assert_eq!(result.base_score, 5 + 10 + 20);
        assert_eq!(result.combo_score, 10);
        assert_eq!(result.total_score, 45);
        assert_eq!(result.signal, "거래량 초폭증");
    }

    #[test]
    fn test_tech_fundamental_combo() {
        let mut result = result_with(&[
            ConditionKey::DailyKdGolden,
            ConditionKey::Break60dHigh,
            ConditionKey::Eps,
            ConditionKey::Roe,
        ]);
        ScoringEngine::new().score(&mut result);
        assert_eq!(result.base_score, 10 + 15 + 5 + 5);
        assert_eq!(result.combo_score, 15);
        assert_eq!(result.total_score, 50);
        assert_eq!(result.signal, "KD 골든크로스 + 60일 신고가 돌파 + 펀더멘털 우량");
    }

    #[test]
    fn test_institutional_combo_requires_two() {
        let mut result = result_with(&[ConditionKey::TrustBuy, ConditionKey::Inst5d]);
        ScoringEngine::new().score(&mut result);
        assert_eq!(result.combo_score, 10);

        let mut single = result_with(&[ConditionKey::TrustBuy]);
        ScoringEngine::new().score(&mut single);
        assert_eq!(single.combo_score, 0);
    }

    #[test]
    fn test_total_score_capped_at_100() {
        let mut result = result_with(ConditionKey::all());
        ScoringEngine::new().score(&mut result);
        assert!(result.base_score + result.combo_score > 100);
        assert_eq!(result.total_score, 100);
        assert_eq!(result.grade, Grade::APlus);
    }

    #[test]
    fn test_no_match_is_neutral_signal() {
        let mut result = result_with(&[]);
        ScoringEngine::new().score(&mut result);
        assert_eq!(result.total_score, 0);
        assert_eq!(result.signal, "관망");
        assert_eq!(result.grade, Grade::C);
    }

    #[test]
    fn test_signal_takes_highest_volume_tier_only() {
        let mut result = result_with(&[
            ConditionKey::VolumeSurge5d,
            ConditionKey::VolumeSurge20d,
        ]);
        ScoringEngine::new().score(&mut result);
        assert_eq!(result.signal, "거래량 폭증");
    }

    #[test]
    fn test_signal_truncated_to_three_labels() {
        let mut result = result_with(&[
            ConditionKey::VolumeSurge60d,
            ConditionKey::DailyKdGolden,
            ConditionKey::Break60dHigh,
            ConditionKey::TrustBuy,
            ConditionKey::Trust5d,
        ]);
        ScoringEngine::new().score(&mut result);
        assert_eq!(
            result.signal,
            "거래량 초폭증 + KD 골든크로스 + 60일 신고가 돌파"
        );
    }

    #[test]
    fn test_market_gate_conditions_score_zero() {
        let mut result = result_with(&[
            ConditionKey::MarketTwse,
            ConditionKey::TrustHolding,
        ]);
        ScoringEngine::new().score(&mut result);
        assert_eq!(result.base_score, 0);
        assert_eq!(result.signal, "관망");
    }
}

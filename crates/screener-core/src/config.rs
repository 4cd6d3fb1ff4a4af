//! 스크리닝 설정 관리.
//!
//! 한 번의 스크리닝 실행에 대한 불변 설정 스냅샷을 정의합니다.
//! 조건별로 활성화 플래그와 타입이 지정된 임계값을 가지며,
//! 로드 시점에 `validate()`로 검증합니다. 실행 중에는 변경되지 않습니다.

use crate::domain::screening::ConditionKey;
use crate::error::CoreError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// 임계값이 있는 조건 설정.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCondition {
    /// 활성화 여부
    pub enabled: bool,
    /// 임계값
    pub threshold: Decimal,
}

impl ThresholdCondition {
    /// 활성화된 조건을 생성합니다.
    pub fn enabled(threshold: Decimal) -> Self {
        Self {
            enabled: true,
            threshold,
        }
    }

    /// 비활성화된 조건을 생성합니다 (임계값은 기본값 유지).
    pub fn disabled(threshold: Decimal) -> Self {
        Self {
            enabled: false,
            threshold,
        }
    }
}

/// 온/오프만 있는 조건 설정.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToggleCondition {
    /// 활성화 여부
    pub enabled: bool,
}

impl ToggleCondition {
    /// 활성화된 토글을 생성합니다.
    pub fn on() -> Self {
        Self { enabled: true }
    }
}

/// 연속 상한가 제외 조건 설정.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitUpExclusion {
    /// 활성화 여부
    pub enabled: bool,
    /// 연속 상한가 일수 기준 (이 일수 이상 연속이면 제외)
    pub days: usize,
}

impl Default for LimitUpExclusion {
    fn default() -> Self {
        Self {
            enabled: false,
            days: 3,
        }
    }
}

fn default_min_conditions() -> usize {
    3
}

fn default_market_on() -> ToggleCondition {
    ToggleCondition::on()
}

fn default_volume_surge_5d() -> ThresholdCondition {
    ThresholdCondition::enabled(dec!(1.5))
}

fn default_volume_surge_20d() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(3.0))
}

fn default_volume_surge_60d() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(5.0))
}

fn default_min_volume() -> ThresholdCondition {
    // 장(1,000주) 단위
    ThresholdCondition::enabled(dec!(1000))
}

fn default_trust_buy() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(500))
}

fn default_trust_pct() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(3.0))
}

fn default_trust_5d() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(1000))
}

fn default_trust_holding() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(15.0))
}

fn default_inst_5d() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(100))
}

fn default_margin_ratio() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(5.0))
}

fn default_margin_5d() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(10.0))
}

fn default_eps() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(2.0))
}

fn default_roe() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(10.0))
}

fn default_dividend_yield() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(3.0))
}

fn default_daily_change() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(7.0))
}

fn default_change_5d() -> ThresholdCondition {
    ThresholdCondition::disabled(dec!(20.0))
}

/// 한 번의 스크리닝 실행 설정.
///
/// 기본값은 원 시스템의 표준 프리셋을 따릅니다: 5일 거래량 급증(1.5배)과
/// 최저 거래량(1,000장)만 활성화되고 나머지는 비활성 상태로 시작합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// 통과에 필요한 최소 조건 수
    pub min_conditions_to_pass: usize,

    /// 상장(TWSE) 시장 포함
    pub market_twse: ToggleCondition,
    /// 장외(OTC) 시장 포함
    pub market_otc: ToggleCondition,
    /// 신흥 시장 포함
    pub market_emerging: ToggleCondition,

    /// 거래량 급증 (5일 평균 대비 배수)
    pub volume_surge_5d: ThresholdCondition,
    /// 거래량 급증 (20일 평균 대비 배수)
    pub volume_surge_20d: ThresholdCondition,
    /// 거래량 급증 (60일 평균 대비 배수)
    pub volume_surge_60d: ThresholdCondition,
    /// 최저 거래량 (장 단위)
    pub min_volume: ThresholdCondition,

    /// 일간 KD 골든크로스
    pub daily_kd_golden: ToggleCondition,
    /// 월간(20일) KD 골든크로스
    pub monthly_kd_golden: ToggleCondition,
    /// 종가가 MA20 위
    pub above_ma20: ToggleCondition,
    /// 60일 신고가 돌파
    pub break_60d_high: ToggleCondition,

    /// 투신 당일 순매수 (장 단위)
    pub trust_buy: ThresholdCondition,
    /// 투신 지분율 하한 (%)
    pub trust_pct: ThresholdCondition,
    /// 투신 5일 누적 순매수 (장 단위)
    pub trust_5d: ThresholdCondition,
    /// 투신 지분율 상한 (%)
    pub trust_holding: ThresholdCondition,
    /// 3대 법인 5일 누적 순매수 (장 단위)
    pub inst_5d: ThresholdCondition,

    /// 융자 사용률 상한 (%)
    pub margin_ratio: ThresholdCondition,
    /// 융자 5일 증감 (장 단위)
    pub margin_5d: ThresholdCondition,

    /// EPS 하한
    pub eps: ThresholdCondition,
    /// ROE 하한 (%)
    pub roe: ThresholdCondition,
    /// 배당수익률 하한 (%)
    pub dividend_yield: ThresholdCondition,

    /// 일간 등락률 상한 (±%)
    pub daily_change: ThresholdCondition,
    /// 5일 누적 등락률 상한 (±%)
    pub change_5d: ThresholdCondition,

    /// 경고 종목 제외
    pub exclude_warning: ToggleCondition,
    /// 처치 종목 제외
    pub exclude_disposition: ToggleCondition,
    /// 연속 상한가 제외
    pub exclude_limit_up: LimitUpExclusion,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            min_conditions_to_pass: default_min_conditions(),
            market_twse: default_market_on(),
            market_otc: default_market_on(),
            market_emerging: ToggleCondition::default(),
            volume_surge_5d: default_volume_surge_5d(),
            volume_surge_20d: default_volume_surge_20d(),
            volume_surge_60d: default_volume_surge_60d(),
            min_volume: default_min_volume(),
            daily_kd_golden: ToggleCondition::default(),
            monthly_kd_golden: ToggleCondition::default(),
            above_ma20: ToggleCondition::default(),
            break_60d_high: ToggleCondition::default(),
            trust_buy: default_trust_buy(),
            trust_pct: default_trust_pct(),
            trust_5d: default_trust_5d(),
            trust_holding: default_trust_holding(),
            inst_5d: default_inst_5d(),
            margin_ratio: default_margin_ratio(),
            margin_5d: default_margin_5d(),
            eps: default_eps(),
            roe: default_roe(),
            dividend_yield: default_dividend_yield(),
            daily_change: default_daily_change(),
            change_5d: default_change_5d(),
            exclude_warning: ToggleCondition::default(),
            exclude_disposition: ToggleCondition::default(),
            exclude_limit_up: LimitUpExclusion::default(),
        }
    }
}

impl ScreeningConfig {
    /// TOML 문자열에서 설정을 로드하고 검증합니다.
    pub fn from_toml_str(s: &str) -> Result<Self, CoreError> {
        let config: Self =
            toml::from_str(s).map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열로 직렬화합니다.
    pub fn to_toml_string(&self) -> Result<String, CoreError> {
        toml::to_string_pretty(self).map_err(|e| CoreError::InvalidConfig(e.to_string()))
    }

    /// 활성화된 조건 수를 반환합니다.
    pub fn enabled_condition_count(&self) -> usize {
        ConditionKey::all()
            .iter()
            .filter(|&&key| self.is_enabled(key))
            .count()
    }

    /// 조건 활성화 여부를 반환합니다.
    pub fn is_enabled(&self, key: ConditionKey) -> bool {
        match key {
            ConditionKey::MarketTwse => self.market_twse.enabled,
            ConditionKey::MarketOtc => self.market_otc.enabled,
            ConditionKey::VolumeSurge5d => self.volume_surge_5d.enabled,
            ConditionKey::VolumeSurge20d => self.volume_surge_20d.enabled,
            ConditionKey::VolumeSurge60d => self.volume_surge_60d.enabled,
            ConditionKey::MinVolume => self.min_volume.enabled,
            ConditionKey::DailyKdGolden => self.daily_kd_golden.enabled,
            ConditionKey::MonthlyKdGolden => self.monthly_kd_golden.enabled,
            ConditionKey::AboveMa20 => self.above_ma20.enabled,
            ConditionKey::Break60dHigh => self.break_60d_high.enabled,
            ConditionKey::TrustBuy => self.trust_buy.enabled,
            ConditionKey::TrustPct => self.trust_pct.enabled,
            ConditionKey::Trust5d => self.trust_5d.enabled,
            ConditionKey::TrustHolding => self.trust_holding.enabled,
            ConditionKey::Inst5d => self.inst_5d.enabled,
            ConditionKey::MarginRatio => self.margin_ratio.enabled,
            ConditionKey::Margin5d => self.margin_5d.enabled,
            ConditionKey::Eps => self.eps.enabled,
            ConditionKey::Roe => self.roe.enabled,
            ConditionKey::DividendYield => self.dividend_yield.enabled,
            ConditionKey::DailyChange => self.daily_change.enabled,
            ConditionKey::Change5d => self.change_5d.enabled,
            ConditionKey::NotWarning => self.exclude_warning.enabled,
            ConditionKey::NotDisposition => self.exclude_disposition.enabled,
            ConditionKey::NotLimitUp => self.exclude_limit_up.enabled,
        }
    }

    /// 설정을 검증합니다.
    ///
    /// 활성화된 조건의 임계값이 의미를 가지는 범위인지,
    /// 통과 기준이 활성 조건 수를 넘지 않는지 확인합니다.
    pub fn validate(&self) -> Result<(), CoreError> {
        let positive_thresholds = [
            ("volume_surge_5d", &self.volume_surge_5d),
            ("volume_surge_20d", &self.volume_surge_20d),
            ("volume_surge_60d", &self.volume_surge_60d),
            ("min_volume", &self.min_volume),
            ("margin_ratio", &self.margin_ratio),
            ("daily_change", &self.daily_change),
            ("change_5d", &self.change_5d),
        ];
        for (name, condition) in positive_thresholds {
            if condition.enabled && condition.threshold <= Decimal::ZERO {
                return Err(CoreError::InvalidConfig(format!(
                    "{} threshold must be positive, got {}",
                    name, condition.threshold
                )));
            }
        }

        let percent_bounds = [
            ("trust_pct", &self.trust_pct),
            ("trust_holding", &self.trust_holding),
        ];
        for (name, condition) in percent_bounds {
            if condition.enabled
                && (condition.threshold <= Decimal::ZERO || condition.threshold > dec!(100))
            {
                return Err(CoreError::InvalidConfig(format!(
                    "{} threshold must be in (0, 100], got {}",
                    name, condition.threshold
                )));
            }
        }

        if self.exclude_limit_up.enabled && self.exclude_limit_up.days == 0 {
            return Err(CoreError::InvalidConfig(
                "exclude_limit_up.days must be at least 1".to_string(),
            ));
        }

        let enabled = self.enabled_condition_count();
        if self.min_conditions_to_pass > enabled {
            return Err(CoreError::InvalidConfig(format!(
                "min_conditions_to_pass ({}) exceeds enabled condition count ({})",
                self.min_conditions_to_pass, enabled
            )));
        }

        Ok(())
    }
}

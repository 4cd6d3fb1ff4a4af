//! 조건 평가기.
//!
//! 해석 완료된 종목 스냅샷과 실행 설정을 받아, 활성화된 조건 각각에
//! 대해 통과/실패와 표시용 값을 기록합니다.
//!
//! 평가 규칙:
//! - 스냅샷만 읽습니다. 평가 중 재조회는 없습니다.
//! - 비활성 조건은 판정 맵에 아예 기록되지 않습니다 (실패로 기록하지
//!   않음).
//! - 필요한 지표가 데이터 부족으로 정의되지 않으면 해당 조건은
//!   `passed = false`에 "N/A" 표시로 기록됩니다. 예외를 던지지 않습니다.
//! - 같은 스냅샷과 설정에 대해 항상 동일한 결과를 반환합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use tracing::debug;

use crate::indicators::{above_ma, change_pct, kd, rolling_max, surge_ratio, KdParams};
use screener_core::{
    ConditionKey, ConditionVerdict, FlowRecord, InstitutionalCategory, InstrumentSnapshot,
    MarketKind, PriceBar, ScreeningConfig, ScreeningResult,
};

/// 주 단위 수량을 장(1,000주) 단위로 변환합니다.
fn lots(shares: Decimal) -> Decimal {
    shares / dec!(1000)
}

/// 조건 평가기.
///
/// 상태가 없으며 스냅샷 간에 공유해도 안전합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 새 평가기를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 활성화된 모든 조건을 평가합니다.
    pub fn evaluate(
        &self,
        snapshot: &InstrumentSnapshot,
        config: &ScreeningConfig,
    ) -> ScreeningResult {
        let mut verdicts = BTreeMap::new();

        for &key in ConditionKey::all() {
            if !config.is_enabled(key) {
                continue;
            }
            let verdict = self.evaluate_condition(key, snapshot, config);
            verdicts.insert(key, verdict);
        }

        let result =
            ScreeningResult::from_verdicts(snapshot.id.clone(), verdicts, config.min_conditions_to_pass);
        debug!(
            instrument = %snapshot.id,
            matched = result.matched_count,
            required = config.min_conditions_to_pass,
            passed = result.passed,
            "조건 평가 완료"
        );
        result
    }

    fn evaluate_condition(
        &self,
        key: ConditionKey,
        snapshot: &InstrumentSnapshot,
        config: &ScreeningConfig,
    ) -> ConditionVerdict {
        match key {
            ConditionKey::MarketTwse => self.market_verdict(snapshot, MarketKind::Twse),
            ConditionKey::MarketOtc => self.market_verdict(snapshot, MarketKind::Otc),
            ConditionKey::VolumeSurge5d => {
                self.volume_surge_verdict(snapshot, 5, config.volume_surge_5d.threshold)
            }
            ConditionKey::VolumeSurge20d => {
                self.volume_surge_verdict(snapshot, 20, config.volume_surge_20d.threshold)
            }
            ConditionKey::VolumeSurge60d => {
                self.volume_surge_verdict(snapshot, 60, config.volume_surge_60d.threshold)
            }
            ConditionKey::MinVolume => {
                self.min_volume_verdict(snapshot, config.min_volume.threshold)
            }
            ConditionKey::DailyKdGolden => self.kd_verdict(snapshot, KdParams::daily(), ""),
            ConditionKey::MonthlyKdGolden => {
                self.kd_verdict(snapshot, KdParams::monthly(), "monthly ")
            }
            ConditionKey::AboveMa20 => self.above_ma20_verdict(snapshot),
            ConditionKey::Break60dHigh => self.break_60d_high_verdict(snapshot),
            ConditionKey::TrustBuy => self.trust_buy_verdict(snapshot, config.trust_buy.threshold),
            ConditionKey::TrustPct => {
                let value = snapshot.trust_holding_pct.value;
                let threshold = config.trust_pct.threshold;
                ConditionVerdict::new(
                    value >= threshold,
                    format!("trust holding: {:.2}% (min {}%)", value, threshold),
                )
            }
            ConditionKey::Trust5d => self.trust_5d_verdict(snapshot, config.trust_5d.threshold),
            ConditionKey::TrustHolding => {
                let value = snapshot.trust_holding_pct.value;
                let threshold = config.trust_holding.threshold;
                ConditionVerdict::new(
                    value < threshold,
                    format!("trust holding: {:.2}% (max {}%)", value, threshold),
                )
            }
            ConditionKey::Inst5d => self.inst_5d_verdict(snapshot, config.inst_5d.threshold),
            ConditionKey::MarginRatio => {
                self.margin_ratio_verdict(snapshot, config.margin_ratio.threshold)
            }
            ConditionKey::Margin5d => self.margin_5d_verdict(snapshot, config.margin_5d.threshold),
            ConditionKey::Eps => {
                let value = snapshot.eps.value;
                let threshold = config.eps.threshold;
                ConditionVerdict::new(
                    value > threshold,
                    format!("EPS: {:.2} (min {})", value, threshold),
                )
            }
            ConditionKey::Roe => {
                let value = snapshot.roe.value;
                let threshold = config.roe.threshold;
                ConditionVerdict::new(
                    value > threshold,
                    format!("ROE: {:.2}% (min {}%)", value, threshold),
                )
            }
            ConditionKey::DividendYield => {
                let value = snapshot.dividend_yield.value;
                let threshold = config.dividend_yield.threshold;
                ConditionVerdict::new(
                    value > threshold,
                    format!("yield: {:.2}% (min {}%)", value, threshold),
                )
            }
            ConditionKey::DailyChange => {
                self.change_verdict(snapshot, 1, config.daily_change.threshold, "daily change")
            }
            ConditionKey::Change5d => {
                // 원 데이터 소스 관례상 5일 등락률은 4봉 전 종가 대비
                self.change_verdict(snapshot, 4, config.change_5d.threshold, "5d change")
            }
            ConditionKey::NotWarning => {
                let passed = !snapshot.flags.is_warning;
                ConditionVerdict::new(passed, if passed { "not flagged" } else { "warning flagged" })
            }
            ConditionKey::NotDisposition => {
                let passed = !snapshot.flags.is_disposition;
                ConditionVerdict::new(
                    passed,
                    if passed {
                        "not flagged"
                    } else {
                        "disposition flagged"
                    },
                )
            }
            ConditionKey::NotLimitUp => {
                self.not_limit_up_verdict(snapshot, config.exclude_limit_up.days)
            }
        }
    }

    fn market_verdict(&self, snapshot: &InstrumentSnapshot, expected: MarketKind) -> ConditionVerdict {
        ConditionVerdict::new(
            snapshot.market == expected,
            format!("market: {}", snapshot.market),
        )
    }

    fn volume_surge_verdict(
        &self,
        snapshot: &InstrumentSnapshot,
        window: usize,
        threshold: Decimal,
    ) -> ConditionVerdict {
        let volumes = snapshot.prices.volumes();
        match surge_ratio(&volumes, window) {
            Some(ratio) => ConditionVerdict::new(
                ratio >= threshold,
                format!("surge: {:.2}x (min {}x)", ratio, threshold),
            ),
            None => ConditionVerdict::new(false, format!("surge: N/A (min {}x)", threshold)),
        }
    }

    fn min_volume_verdict(&self, snapshot: &InstrumentSnapshot, threshold: Decimal) -> ConditionVerdict {
        match snapshot.prices.latest() {
            Some(bar) => {
                let threshold_shares = threshold * dec!(1000);
                ConditionVerdict::new(
                    bar.volume >= threshold_shares,
                    format!("volume: {:.0} lots (min {} lots)", lots(bar.volume), threshold),
                )
            }
            None => ConditionVerdict::new(false, format!("volume: N/A (min {} lots)", threshold)),
        }
    }

    fn kd_verdict(
        &self,
        snapshot: &InstrumentSnapshot,
        params: KdParams,
        prefix: &str,
    ) -> ConditionVerdict {
        match kd(snapshot.prices.bars(), params) {
            Ok(series) => {
                let passed = series.golden_cross();
                match series.latest() {
                    Some((k, d)) => ConditionVerdict::new(
                        passed,
                        format!("{}K={:.1}, D={:.1}", prefix, k, d),
                    ),
                    None => ConditionVerdict::new(false, format!("{}K=N/A, D=N/A", prefix)),
                }
            }
            Err(_) => ConditionVerdict::new(false, format!("{}K=N/A, D=N/A", prefix)),
        }
    }

    fn above_ma20_verdict(&self, snapshot: &InstrumentSnapshot) -> ConditionVerdict {
        let closes = snapshot.prices.closes();
        match above_ma(&closes, 20) {
            Some((passed, close, ma)) => ConditionVerdict::new(
                passed,
                format!("close: {:.1}, MA20: {:.1}", close, ma),
            ),
            None => ConditionVerdict::new(false, "close: N/A, MA20: N/A"),
        }
    }

    fn break_60d_high_verdict(&self, snapshot: &InstrumentSnapshot) -> ConditionVerdict {
        let highs = snapshot.prices.highs();
        let close = snapshot.prices.latest().map(|b| b.close);
        match (rolling_max(&highs, 60), close) {
            (Some(high_60d), Some(close)) => ConditionVerdict::new(
                close >= high_60d,
                format!("close: {:.1}, 60d high: {:.1}", close, high_60d),
            ),
            _ => ConditionVerdict::new(false, "close: N/A, 60d high: N/A"),
        }
    }

    /// 투신 매매 기록만 날짜순으로 추립니다.
    fn trust_records<'a>(&self, snapshot: &'a InstrumentSnapshot) -> Vec<&'a FlowRecord> {
        snapshot
            .flows
            .iter()
            .filter(|r| r.category == InstitutionalCategory::InvestmentTrust)
            .collect()
    }

    fn trust_buy_verdict(&self, snapshot: &InstrumentSnapshot, threshold: Decimal) -> ConditionVerdict {
        let trust = self.trust_records(snapshot);
        match trust.last() {
            Some(latest) => {
                let net_lots = lots(latest.net());
                ConditionVerdict::new(
                    net_lots >= threshold,
                    format!("trust net buy: {:.0} lots (min {} lots)", net_lots, threshold),
                )
            }
            None => {
                ConditionVerdict::new(false, format!("trust net buy: N/A (min {} lots)", threshold))
            }
        }
    }

    fn trust_5d_verdict(&self, snapshot: &InstrumentSnapshot, threshold: Decimal) -> ConditionVerdict {
        let trust = self.trust_records(snapshot);
        if trust.len() < 5 {
            return ConditionVerdict::new(
                false,
                format!("trust 5d net: N/A (min {} lots)", threshold),
            );
        }
        let net: Decimal = trust[trust.len() - 5..].iter().map(|r| r.net()).sum();
        let net_lots = lots(net);
        ConditionVerdict::new(
            net_lots >= threshold,
            format!("trust 5d net: {:.0} lots (min {} lots)", net_lots, threshold),
        )
    }

    fn inst_5d_verdict(&self, snapshot: &InstrumentSnapshot, threshold: Decimal) -> ConditionVerdict {
        // 최근 5거래일: 기록은 날짜 오름차순이므로 고유 날짜의 꼬리 5개
        let mut dates: Vec<_> = snapshot.flows.iter().map(|r| r.date).collect();
        dates.dedup();
        if dates.len() < 5 {
            return ConditionVerdict::new(
                false,
                format!("inst 5d net: N/A (min {} lots)", threshold),
            );
        }
        let cutoff = dates[dates.len() - 5];
        let net: Decimal = snapshot
            .flows
            .iter()
            .filter(|r| r.date >= cutoff)
            .map(|r| r.net())
            .sum();
        let net_lots = lots(net);
        ConditionVerdict::new(
            net_lots >= threshold,
            format!("inst 5d net: {:.0} lots (min {} lots)", net_lots, threshold),
        )
    }

    fn margin_ratio_verdict(&self, snapshot: &InstrumentSnapshot, threshold: Decimal) -> ConditionVerdict {
        match snapshot.margins.last().and_then(|m| m.utilization_pct()) {
            Some(ratio) => ConditionVerdict::new(
                ratio < threshold,
                format!("margin utilization: {:.2}% (max {}%)", ratio, threshold),
            ),
            None => ConditionVerdict::new(
                false,
                format!("margin utilization: N/A (max {}%)", threshold),
            ),
        }
    }

    fn margin_5d_verdict(&self, snapshot: &InstrumentSnapshot, threshold: Decimal) -> ConditionVerdict {
        let margins = &snapshot.margins;
        if margins.len() < 5 {
            return ConditionVerdict::new(
                false,
                format!("margin 5d change: N/A (min {} lots)", threshold),
            );
        }
        let current = margins[margins.len() - 1].balance;
        let past = margins[margins.len() - 5].balance;
        let change_lots = lots(current - past);
        ConditionVerdict::new(
            change_lots >= threshold,
            format!("margin 5d change: {:.0} lots (min {} lots)", change_lots, threshold),
        )
    }

    fn change_verdict(
        &self,
        snapshot: &InstrumentSnapshot,
        offset: usize,
        threshold: Decimal,
        label: &str,
    ) -> ConditionVerdict {
        let closes = snapshot.prices.closes();
        match change_pct(&closes, offset) {
            Some(change) => ConditionVerdict::new(
                change.abs() <= threshold,
                format!("{}: {:.2}% (limit ±{}%)", label, change, threshold),
            ),
            None => ConditionVerdict::new(false, format!("{}: N/A (limit ±{}%)", label, threshold)),
        }
    }

    fn not_limit_up_verdict(&self, snapshot: &InstrumentSnapshot, days: usize) -> ConditionVerdict {
        let streak = limit_up_streak(snapshot.prices.bars(), snapshot.flags.is_disposition, days);
        ConditionVerdict::new(
            streak < days,
            format!("limit-up streak: {} days (max {})", streak, days),
        )
    }
}

/// 최근 연속 상한가 일수를 계산합니다.
///
/// 상한가 판정: 전일 대비 등락률이 (가격제한폭 - 0.1%p) 이상이고 종가가
/// 당일 고가의 0.1% 이내. 가격제한폭은 처치 종목 5%, 일반 종목 10%.
/// 마지막 봉부터 거꾸로 세며, 조건이 깨지거나 비교할 전일 봉이 없으면
/// 중단합니다.
fn limit_up_streak(bars: &[PriceBar], is_disposition: bool, max_days: usize) -> usize {
    let limit = if is_disposition { dec!(5.0) } else { dec!(10.0) };
    let hit_threshold = limit - dec!(0.1);

    let mut streak = 0;
    for i in 0..max_days {
        if bars.len() < i + 2 {
            break;
        }
        let idx = bars.len() - 1 - i;
        let curr = &bars[idx];
        let prev_close = bars[idx - 1].close;
        if prev_close <= Decimal::ZERO {
            break;
        }

        let change = (curr.close - prev_close) / prev_close * dec!(100);
        let closed_at_high = (curr.close - curr.high).abs() < prev_close * dec!(0.001);
        if change >= hit_threshold && closed_at_high {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use screener_core::{
        InstrumentFlags, InstrumentId, MetricSource, PriceSeries, ResolvedMetric,
        ThresholdCondition, ToggleCondition,
    };

    fn date(offset: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset as i64)
    }

    fn flat_bar(offset: u32, close: Decimal, volume: Decimal) -> PriceBar {
        PriceBar::new(date(offset), close, close, close, close, volume)
    }

    fn base_snapshot(bars: Vec<PriceBar>) -> InstrumentSnapshot {
        InstrumentSnapshot {
            id: InstrumentId::new("2330"),
            market: MarketKind::Twse,
            prices: PriceSeries::from_bars(bars),
            flows: Vec::new(),
            margins: Vec::new(),
            eps: ResolvedMetric::new(dec!(39.2), MetricSource::Primary),
            roe: ResolvedMetric::new(dec!(28.5), MetricSource::Primary),
            dividend_yield: ResolvedMetric::new(dec!(1.5), MetricSource::Default),
            trust_holding_pct: ResolvedMetric::new(dec!(0.8), MetricSource::Primary),
            flags: InstrumentFlags::default(),
            flags_source: MetricSource::Primary,
        }
    }

    /// 모든 조건이 꺼진 설정 (테스트에서 필요한 것만 켬).
    fn empty_config() -> ScreeningConfig {
        let mut config = ScreeningConfig::default();
        config.market_twse = ToggleCondition::default();
        config.market_otc = ToggleCondition::default();
        config.volume_surge_5d.enabled = false;
        config.min_volume.enabled = false;
        config.min_conditions_to_pass = 0;
        config
    }

    #[test]
    fn test_fundamental_scenario_three_conditions_pass() {
        // EPS=39.2, ROE=28.5, 투신 지분 0.8% / EPS>0, ROE>10, 지분<15 모두 통과
        let bars = vec![flat_bar(0, dec!(1045), dec!(20_000_000)), flat_bar(1, dec!(1050), dec!(25_000_000))];
        let snapshot = base_snapshot(bars);

        let mut config = empty_config();
        config.eps = ThresholdCondition::enabled(Decimal::ZERO);
        config.roe = ThresholdCondition::enabled(dec!(10));
        config.trust_holding = ThresholdCondition::enabled(dec!(15));
        config.min_conditions_to_pass = 3;

        let result = ConditionEvaluator::new().evaluate(&snapshot, &config);
        assert_eq!(result.matched_count, 3);
        assert!(result.passed);
        assert_eq!(result.verdicts.len(), 3);
        assert_eq!(
            result.verdicts[&ConditionKey::Eps].display_value,
            "EPS: 39.20 (min 0)"
        );
    }

    #[test]
    fn test_disabled_conditions_are_omitted() {
        let snapshot = base_snapshot(vec![flat_bar(0, dec!(100), dec!(1000))]);
        let config = empty_config();

        let result = ConditionEvaluator::new().evaluate(&snapshot, &config);
        assert!(result.verdicts.is_empty());
        assert_eq!(result.matched_count, 0);
    }

    #[test]
    fn test_short_series_kd_is_na_fail() {
        // 5봉 시리즈, 9봉 KD 요구 → N/A 실패
        let bars = (0..5).map(|i| flat_bar(i, dec!(100), dec!(1000))).collect();
        let snapshot = base_snapshot(bars);

        let mut config = empty_config();
        config.daily_kd_golden = ToggleCondition::on();

        let result = ConditionEvaluator::new().evaluate(&snapshot, &config);
        let verdict = &result.verdicts[&ConditionKey::DailyKdGolden];
        assert!(!verdict.passed);
        assert_eq!(verdict.display_value, "K=N/A, D=N/A");
    }

    #[test]
    fn test_volume_surge_zero_average_is_na_fail() {
        let mut bars: Vec<PriceBar> = (0..5).map(|i| flat_bar(i, dec!(100), Decimal::ZERO)).collect();
        bars.push(flat_bar(5, dec!(100), dec!(500_000)));
        let snapshot = base_snapshot(bars);

        let mut config = empty_config();
        config.volume_surge_5d = ThresholdCondition::enabled(dec!(1.5));

        let result = ConditionEvaluator::new().evaluate(&snapshot, &config);
        let verdict = &result.verdicts[&ConditionKey::VolumeSurge5d];
        assert!(!verdict.passed);
        assert_eq!(verdict.display_value, "surge: N/A (min 1.5x)");
    }

    #[test]
    fn test_volume_surge_passes_at_threshold() {
        let mut bars: Vec<PriceBar> =
            (0..5).map(|i| flat_bar(i, dec!(100), dec!(1_000_000))).collect();
        bars.push(flat_bar(5, dec!(100), dec!(1_500_000)));
        let snapshot = base_snapshot(bars);

        let mut config = empty_config();
        config.volume_surge_5d = ThresholdCondition::enabled(dec!(1.5));

        let result = ConditionEvaluator::new().evaluate(&snapshot, &config);
        let verdict = &result.verdicts[&ConditionKey::VolumeSurge5d];
        assert!(verdict.passed);
        assert_eq!(verdict.display_value, "surge: 1.50x (min 1.5x)");
    }

    #[test]
    fn test_min_volume_uses_lots() {
        let snapshot = base_snapshot(vec![flat_bar(0, dec!(100), dec!(25_000_000))]);

        let mut config = empty_config();
        config.min_volume = ThresholdCondition::enabled(dec!(1000));

        let result = ConditionEvaluator::new().evaluate(&snapshot, &config);
        let verdict = &result.verdicts[&ConditionKey::MinVolume];
        assert!(verdict.passed);
        assert_eq!(verdict.display_value, "volume: 25000 lots (min 1000 lots)");
    }

    #[test]
    fn test_consecutive_limit_up_excludes_disposition_instrument() {
        // 처치 종목: 제한폭 5%, 4.9% 이상 상승 + 고가 마감 3연속 → 제외
        let mut close = dec!(100);
        let mut bars = vec![flat_bar(0, close, dec!(1_000_000))];
        for i in 1..=3u32 {
            close = (close * dec!(1.05)).round_dp(2);
            bars.push(flat_bar(i, close, dec!(1_000_000)));
        }
        let mut snapshot = base_snapshot(bars);
        snapshot.flags.is_disposition = true;

        let mut config = empty_config();
        config.exclude_limit_up = screener_core::LimitUpExclusion {
            enabled: true,
            days: 3,
        };

        let result = ConditionEvaluator::new().evaluate(&snapshot, &config);
        let verdict = &result.verdicts[&ConditionKey::NotLimitUp];
        assert!(!verdict.passed);
        assert_eq!(verdict.display_value, "limit-up streak: 3 days (max 3)");
    }

    #[test]
    fn test_limit_up_streak_breaks_on_normal_bar() {
        // 일반 종목: 10% 상한가 2회 후 보합 → 연속 0일로 통과
        let bars = vec![
            flat_bar(0, dec!(100), dec!(1_000_000)),
            flat_bar(1, dec!(110), dec!(1_000_000)),
            flat_bar(2, dec!(121), dec!(1_000_000)),
            flat_bar(3, dec!(121), dec!(1_000_000)),
        ];
        let snapshot = base_snapshot(bars);

        let mut config = empty_config();
        config.exclude_limit_up = screener_core::LimitUpExclusion {
            enabled: true,
            days: 3,
        };

        let result = ConditionEvaluator::new().evaluate(&snapshot, &config);
        let verdict = &result.verdicts[&ConditionKey::NotLimitUp];
        assert!(verdict.passed);
        assert_eq!(verdict.display_value, "limit-up streak: 0 days (max 3)");
    }

    #[test]
    fn test_trust_flow_conditions() {
        let mut snapshot = base_snapshot(vec![flat_bar(9, dec!(100), dec!(1000))]);
        for i in 0..5u32 {
            snapshot.flows.push(FlowRecord {
                date: date(i),
                category: InstitutionalCategory::InvestmentTrust,
                buy: dec!(700_000),
                sell: dec!(200_000),
            });
            snapshot.flows.push(FlowRecord {
                date: date(i),
                category: InstitutionalCategory::ForeignInvestor,
                buy: dec!(100_000),
                sell: dec!(400_000),
            });
        }

        let mut config = empty_config();
        config.trust_buy = ThresholdCondition::enabled(dec!(500));
        config.trust_5d = ThresholdCondition::enabled(dec!(1000));
        config.inst_5d = ThresholdCondition::enabled(dec!(100));

        let result = ConditionEvaluator::new().evaluate(&snapshot, &config);
        // 투신 당일 순매수 500장 ≥ 500
        assert!(result.verdicts[&ConditionKey::TrustBuy].passed);
        // 투신 5일 누적 2,500장 ≥ 1,000
        assert!(result.verdicts[&ConditionKey::Trust5d].passed);
        // 3대 법인 합산 (500 - 300) × 5일 = 1,000장 ≥ 100
        assert!(result.verdicts[&ConditionKey::Inst5d].passed);
    }

    #[test]
    fn test_missing_flow_feed_is_na_fail() {
        let snapshot = base_snapshot(vec![flat_bar(0, dec!(100), dec!(1000))]);

        let mut config = empty_config();
        config.trust_buy = ThresholdCondition::enabled(dec!(500));
        config.inst_5d = ThresholdCondition::enabled(dec!(100));

        let result = ConditionEvaluator::new().evaluate(&snapshot, &config);
        let trust = &result.verdicts[&ConditionKey::TrustBuy];
        assert!(!trust.passed);
        assert!(trust.display_value.contains("N/A"));
        assert!(!result.verdicts[&ConditionKey::Inst5d].passed);
    }

    #[test]
    fn test_margin_conditions() {
        let mut snapshot = base_snapshot(vec![flat_bar(9, dec!(100), dec!(1000))]);
        for i in 0..5u32 {
            snapshot.margins.push(screener_core::MarginRecord {
                date: date(i),
                balance: dec!(200_000) + Decimal::from(i) * dec!(30_000),
                limit: dec!(10_000_000),
            });
        }

        let mut config = empty_config();
        config.margin_ratio = ThresholdCondition::enabled(dec!(5));
        config.margin_5d = ThresholdCondition::enabled(dec!(10));

        let result = ConditionEvaluator::new().evaluate(&snapshot, &config);
        // 320,000 / 10,000,000 = 3.2% < 5%
        let ratio = &result.verdicts[&ConditionKey::MarginRatio];
        assert!(ratio.passed);
        assert_eq!(ratio.display_value, "margin utilization: 3.20% (max 5%)");
        // (320,000 - 200,000) / 1000 = 120장 ≥ 10장
        assert!(result.verdicts[&ConditionKey::Margin5d].passed);
    }

    #[test]
    fn test_margin_ratio_zero_limit_is_na_fail() {
        let mut snapshot = base_snapshot(vec![flat_bar(0, dec!(100), dec!(1000))]);
        snapshot.margins.push(screener_core::MarginRecord {
            date: date(0),
            balance: dec!(1000),
            limit: Decimal::ZERO,
        });

        let mut config = empty_config();
        config.margin_ratio = ThresholdCondition::enabled(dec!(5));

        let result = ConditionEvaluator::new().evaluate(&snapshot, &config);
        let verdict = &result.verdicts[&ConditionKey::MarginRatio];
        assert!(!verdict.passed);
        assert!(verdict.display_value.contains("N/A"));
    }

    #[test]
    fn test_change_bounds() {
        let bars = vec![
            flat_bar(0, dec!(100), dec!(1000)),
            flat_bar(1, dec!(101), dec!(1000)),
            flat_bar(2, dec!(102), dec!(1000)),
            flat_bar(3, dec!(103), dec!(1000)),
            flat_bar(4, dec!(105), dec!(1000)),
        ];
        let snapshot = base_snapshot(bars);

        let mut config = empty_config();
        config.daily_change = ThresholdCondition::enabled(dec!(7));
        config.change_5d = ThresholdCondition::enabled(dec!(20));

        let result = ConditionEvaluator::new().evaluate(&snapshot, &config);
        // 전일 대비 약 +1.94%, 4봉 전 대비 +5% → 둘 다 한도 이내
        assert!(result.verdicts[&ConditionKey::DailyChange].passed);
        assert!(result.verdicts[&ConditionKey::Change5d].passed);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let mut bars: Vec<PriceBar> = (0..70)
            .map(|i| flat_bar(i, dec!(100) + Decimal::from(i % 7), dec!(1_000_000)))
            .collect();
        bars.push(flat_bar(70, dec!(108), dec!(3_000_000)));
        let snapshot = base_snapshot(bars);

        let mut config = ScreeningConfig::default();
        config.daily_kd_golden = ToggleCondition::on();
        config.above_ma20 = ToggleCondition::on();
        config.break_60d_high = ToggleCondition::on();
        config.eps = ThresholdCondition::enabled(dec!(2));
        config.min_conditions_to_pass = 3;

        let evaluator = ConditionEvaluator::new();
        let first = evaluator.evaluate(&snapshot, &config);
        let second = evaluator.evaluate(&snapshot, &config);
        assert_eq!(first, second);
    }
}

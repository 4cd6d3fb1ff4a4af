//! 모멘텀 지표.
//!
//! RSI, MACD, 등락률 계산을 제공합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::trend::sma;

/// RSI (Relative Strength Index) 계산.
///
/// 초기 `period`개 변화의 단순 평균으로 시드를 잡고, 이후 구간은
/// Wilder 방식의 지수 평활로 갱신합니다. 데이터 부족 시 None.
pub fn rsi(prices: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || prices.len() < period + 1 {
        return None;
    }

    let mut gains = Decimal::ZERO;
    let mut losses = Decimal::ZERO;
    for i in 1..=period {
        let change = prices[i] - prices[i - 1];
        if change > Decimal::ZERO {
            gains += change;
        } else {
            losses += change.abs();
        }
    }

    let period_dec = Decimal::from(period as u64);
    let mut avg_gain = gains / period_dec;
    let mut avg_loss = losses / period_dec;

    for i in (period + 1)..prices.len() {
        let change = prices[i] - prices[i - 1];
        let (gain, loss) = if change > Decimal::ZERO {
            (change, Decimal::ZERO)
        } else {
            (Decimal::ZERO, change.abs())
        };
        avg_gain = (avg_gain * Decimal::from((period - 1) as u64) + gain) / period_dec;
        avg_loss = (avg_loss * Decimal::from((period - 1) as u64) + loss) / period_dec;
    }

    if avg_loss == Decimal::ZERO {
        return Some(dec!(100));
    }

    let rs = avg_gain / avg_loss;
    Some(dec!(100) - (dec!(100) / (Decimal::ONE + rs)))
}

/// EMA (지수 이동평균) 계산.
///
/// 첫 `period`개 값의 SMA를 시드로 사용합니다. 데이터 부족 시 None.
fn ema(prices: &[Decimal], period: usize) -> Option<Decimal> {
    if period == 0 || prices.len() < period {
        return None;
    }

    let multiplier = dec!(2) / Decimal::from((period + 1) as u64);
    let mut ema = sma(&prices[0..period], period)?;
    for &price in &prices[period..] {
        ema = (price - ema) * multiplier + ema;
    }
    Some(ema)
}

/// EMA 시리즈 계산 (시드 이전 구간은 None).
fn ema_series(prices: &[Decimal], period: usize) -> Vec<Option<Decimal>> {
    let mut result = vec![None; prices.len()];
    if period == 0 || prices.len() < period {
        return result;
    }

    let multiplier = dec!(2) / Decimal::from((period + 1) as u64);
    let mut current = match sma(&prices[0..period], period) {
        Some(seed) => seed,
        None => return result,
    };
    result[period - 1] = Some(current);

    for i in period..prices.len() {
        current = (prices[i] - current) * multiplier + current;
        result[i] = Some(current);
    }
    result
}

/// MACD 계산 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 선 (단기 EMA - 장기 EMA)
    pub macd: Decimal,
    /// 시그널 선 (MACD 선의 EMA)
    pub signal: Decimal,
    /// 히스토그램 (MACD - 시그널)
    pub histogram: Decimal,
}

/// MACD (Moving Average Convergence Divergence) 계산.
///
/// 데이터가 `slow + signal`개 미만이면 None.
pub fn macd(
    prices: &[Decimal],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Option<MacdResult> {
    if fast == 0 || slow == 0 || signal == 0 || fast >= slow {
        return None;
    }
    if prices.len() < slow + signal {
        return None;
    }

    let fast_series = ema_series(prices, fast);
    let slow_series = ema_series(prices, slow);

    // 장기 EMA가 정의된 구간의 MACD 선 이력
    let macd_line: Vec<Decimal> = fast_series
        .iter()
        .zip(slow_series.iter())
        .filter_map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(*f - *s),
            _ => None,
        })
        .collect();

    let macd_value = *macd_line.last()?;
    let signal_value = ema(&macd_line, signal)?;

    Some(MacdResult {
        macd: macd_value,
        signal: signal_value,
        histogram: macd_value - signal_value,
    })
}

/// 등락률(%) 계산.
///
/// 마지막 종가를 `offset`개 이전 종가와 비교합니다 (offset=1이면 전일
/// 대비). 기준 종가가 0 이하이거나 데이터 부족 시 None.
pub fn change_pct(closes: &[Decimal], offset: usize) -> Option<Decimal> {
    if offset == 0 || closes.len() < offset + 1 {
        return None;
    }
    let latest = closes[closes.len() - 1];
    let base = closes[closes.len() - 1 - offset];
    if base <= Decimal::ZERO {
        return None;
    }
    Some((latest - base) / base * Decimal::from(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_all_gains_is_100() {
        let prices: Vec<Decimal> = (1..=20).map(Decimal::from).collect();
        assert_eq!(rsi(&prices, 14), Some(dec!(100)));
    }

    #[test]
    fn test_rsi_balanced_series_is_midrange() {
        // 상승과 하락이 같은 폭으로 반복되는 시리즈
        let mut prices = Vec::new();
        let mut p = dec!(100);
        for i in 0..30 {
            p += if i % 2 == 0 { dec!(1) } else { dec!(-1) };
            prices.push(p);
        }
        let value = rsi(&prices, 14).unwrap();
        assert!(value > dec!(30) && value < dec!(70), "rsi={}", value);
    }

    #[test]
    fn test_rsi_insufficient_data() {
        let prices: Vec<Decimal> = (1..=10).map(Decimal::from).collect();
        assert_eq!(rsi(&prices, 14), None);
    }

    #[test]
    fn test_macd_uptrend_is_positive() {
        let prices: Vec<Decimal> = (1..=60).map(|i| Decimal::from(100 + i)).collect();
        let result = macd(&prices, 12, 26, 9).unwrap();
        assert!(result.macd > Decimal::ZERO);
        assert!(result.signal > Decimal::ZERO);
    }

    #[test]
    fn test_macd_insufficient_data() {
        let prices: Vec<Decimal> = (1..=30).map(Decimal::from).collect();
        assert_eq!(macd(&prices, 12, 26, 9), None);
    }

    #[test]
    fn test_change_pct_daily_and_5d() {
        let closes = vec![dec!(100), dec!(104), dec!(102), dec!(105), dec!(110)];
        // 전일 대비: (110 - 105) / 105
        let daily = change_pct(&closes, 1).unwrap();
        assert!(daily > dec!(4.76) && daily < dec!(4.77), "daily={}", daily);
        // 4봉 전 대비: (110 - 100) / 100
        assert_eq!(change_pct(&closes, 4), Some(dec!(10)));
        assert_eq!(change_pct(&closes, 5), None);
    }

    #[test]
    fn test_change_pct_zero_base_is_none() {
        let closes = vec![Decimal::ZERO, dec!(10)];
        assert_eq!(change_pct(&closes, 1), None);
    }
}

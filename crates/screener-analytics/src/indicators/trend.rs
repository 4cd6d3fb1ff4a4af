//! 추세 지표.
//!
//! 단순 이동평균과 롤링 고저 계산을 제공합니다.

use rust_decimal::Decimal;

/// SMA (단순 이동평균) 계산.
///
/// 마지막 `window`개 값의 평균. 데이터 부족 시 None.
pub fn sma(values: &[Decimal], window: usize) -> Option<Decimal> {
    if window == 0 || values.len() < window {
        return None;
    }
    let sum: Decimal = values[values.len() - window..].iter().sum();
    Some(sum / Decimal::from(window as u64))
}

/// 마지막 `window`개 값 중 최대값.
///
/// 데이터 부족 시 None.
pub fn rolling_max(values: &[Decimal], window: usize) -> Option<Decimal> {
    if window == 0 || values.len() < window {
        return None;
    }
    values[values.len() - window..].iter().copied().max()
}

/// 마지막 `window`개 값 중 최소값.
///
/// 데이터 부족 시 None.
pub fn rolling_min(values: &[Decimal], window: usize) -> Option<Decimal> {
    if window == 0 || values.len() < window {
        return None;
    }
    values[values.len() - window..].iter().copied().min()
}

/// 마지막 종가가 이동평균 위에 있는지 판정합니다.
///
/// (통과 여부, 종가, 이동평균)을 반환하며 데이터 부족 시 None.
pub fn above_ma(closes: &[Decimal], window: usize) -> Option<(bool, Decimal, Decimal)> {
    let ma = sma(closes, window)?;
    let close = *closes.last()?;
    Some((close > ma, close, ma))
}

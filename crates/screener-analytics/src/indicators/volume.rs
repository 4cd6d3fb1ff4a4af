//! 거래량 지표.
//!
//! 거래량 급증 배수 계산을 제공합니다.

use rust_decimal::Decimal;

/// 거래량 급증 배수 계산.
///
/// 마지막 거래량을 직전 `window`개 거래량(당일 제외)의 평균으로 나눈
/// 값입니다. 이력이 `window + 1`개 미만이거나 평균이 0이면 None을
/// 반환하며, 0 나눗셈 오류는 발생하지 않습니다.
pub fn surge_ratio(volumes: &[Decimal], window: usize) -> Option<Decimal> {
    if window == 0 || volumes.len() < window + 1 {
        return None;
    }

    let latest = volumes[volumes.len() - 1];
    let trailing = &volumes[volumes.len() - 1 - window..volumes.len() - 1];
    let avg: Decimal = trailing.iter().sum::<Decimal>() / Decimal::from(window as u64);

    if avg <= Decimal::ZERO {
        return None;
    }
    Some(latest / avg)
}

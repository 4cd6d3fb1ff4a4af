//! 변동성 지표.
//!
//! 볼린저 밴드 계산을 제공합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::trend::sma;

/// 볼린저 밴드 계산 결과.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    /// 상단 밴드
    pub upper: Decimal,
    /// 중간선 (SMA)
    pub middle: Decimal,
    /// 하단 밴드
    pub lower: Decimal,
    /// 밴드 폭 (upper - lower)
    pub width: Decimal,
}

/// 볼린저 밴드 계산.
///
/// 중간선은 `window` SMA, 밴드는 모집단 표준편차 × `std_mult`.
/// 데이터 부족 시 None.
pub fn bollinger(closes: &[Decimal], window: usize, std_mult: Decimal) -> Option<BollingerBands> {
    let middle = sma(closes, window)?;
    let recent = &closes[closes.len() - window..];

    let variance: Decimal = recent
        .iter()
        .map(|&p| {
            let diff = p - middle;
            diff * diff
        })
        .sum::<Decimal>()
        / Decimal::from(window as u64);

    let std = sqrt_newton(variance);
    let half_width = std * std_mult;

    Some(BollingerBands {
        upper: middle + half_width,
        middle,
        lower: middle - half_width,
        width: half_width * dec!(2),
    })
}

/// Newton-Raphson 방식의 Decimal 제곱근 근사.
fn sqrt_newton(value: Decimal) -> Decimal {
    if value <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let two = dec!(2);
    let mut guess = value / two;
    if guess == Decimal::ZERO {
        guess = value;
    }

    for _ in 0..32 {
        let next = (guess + value / guess) / two;
        if (next - guess).abs() < dec!(0.0000000001) {
            return next;
        }
        guess = next;
    }
    guess
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqrt_newton() {
        assert_eq!(sqrt_newton(Decimal::ZERO), Decimal::ZERO);
        let root = sqrt_newton(dec!(2));
        assert!((root - dec!(1.41421356)).abs() < dec!(0.0001), "root={}", root);
        let root = sqrt_newton(dec!(144));
        assert!((root - dec!(12)).abs() < dec!(0.0001), "root={}", root);
    }

    #[test]
    fn test_bollinger_flat_series_collapses() {
        let closes = vec![dec!(100); 20];
        let bands = bollinger(&closes, 20, dec!(2)).unwrap();
        assert_eq!(bands.middle, dec!(100));
        assert_eq!(bands.upper, dec!(100));
        assert_eq!(bands.lower, dec!(100));
        assert_eq!(bands.width, Decimal::ZERO);
    }

    #[test]
    fn test_bollinger_bands_are_symmetric() {
        let closes: Vec<Decimal> = (1..=25).map(|i| Decimal::from(100 + (i % 5))).collect();
        let bands = bollinger(&closes, 20, dec!(2)).unwrap();
        assert!(bands.upper > bands.middle);
        assert!(bands.lower < bands.middle);
        let upper_gap = bands.upper - bands.middle;
        let lower_gap = bands.middle - bands.lower;
        assert!((upper_gap - lower_gap).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_bollinger_insufficient_data() {
        let closes = vec![dec!(100); 10];
        assert_eq!(bollinger(&closes, 20, dec!(2)), None);
    }
}

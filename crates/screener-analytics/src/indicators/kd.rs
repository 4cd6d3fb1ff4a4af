//! KD 스토캐스틱 지표.
//!
//! RSV = (종가 - 윈도우 최저가) / (윈도우 최고가 - 윈도우 최저가) × 100.
//! K는 RSV의 지수가중평균(alpha=1/3), D는 K의 지수가중평균(alpha=1/3).
//! 윈도우의 고가와 저가가 같으면(범위 0) RSV는 50으로 둡니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};
use screener_core::PriceBar;

/// KD 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdParams {
    /// RSV 윈도우 (일간: 9, 월간 근사: 20)
    pub window: usize,
}

impl Default for KdParams {
    fn default() -> Self {
        Self { window: 9 }
    }
}

impl KdParams {
    /// 일간 KD 파라미터 (9일 윈도우).
    pub fn daily() -> Self {
        Self { window: 9 }
    }

    /// 월간 근사 KD 파라미터 (20일 윈도우).
    pub fn monthly() -> Self {
        Self { window: 20 }
    }
}

/// KD 계산 결과 시리즈.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KdSeries {
    /// K 값 시리즈 (입력 일봉과 같은 길이)
    pub k: Vec<Decimal>,
    /// D 값 시리즈 (입력 일봉과 같은 길이)
    pub d: Vec<Decimal>,
}

impl KdSeries {
    /// 마지막 (K, D) 값을 반환합니다.
    pub fn latest(&self) -> Option<(Decimal, Decimal)> {
        match (self.k.last(), self.d.last()) {
            (Some(&k), Some(&d)) => Some((k, d)),
            _ => None,
        }
    }

    /// 골든크로스 여부를 판정합니다.
    ///
    /// 직전 K ≤ 직전 D이고 현재 K > 현재 D이며, 현재 K가 과매수권(80)
    /// 아래일 때 true. K/D 이력이 2개 미만이면 항상 false.
    pub fn golden_cross(&self) -> bool {
        if self.k.len() < 2 || self.d.len() < 2 {
            return false;
        }
        let (prev_k, curr_k) = (self.k[self.k.len() - 2], self.k[self.k.len() - 1]);
        let (prev_d, curr_d) = (self.d[self.d.len() - 2], self.d[self.d.len() - 1]);

        prev_k <= prev_d && curr_k > curr_d && curr_k < dec!(80)
    }

    /// 데드크로스 여부를 판정합니다.
    ///
    /// 직전 K ≥ 직전 D이고 현재 K < 현재 D일 때 true (과매수 가드 없음).
    pub fn death_cross(&self) -> bool {
        if self.k.len() < 2 || self.d.len() < 2 {
            return false;
        }
        let (prev_k, curr_k) = (self.k[self.k.len() - 2], self.k[self.k.len() - 1]);
        let (prev_d, curr_d) = (self.d[self.d.len() - 2], self.d[self.d.len() - 1]);

        prev_k >= prev_d && curr_k < curr_d
    }
}

/// KD 시리즈를 계산합니다.
///
/// 일봉 수가 윈도우보다 적으면 `InsufficientData`를 반환합니다.
/// 윈도우가 차기 전 구간의 RSV는 50으로 둡니다 (중립 시드).
pub fn kd(bars: &[PriceBar], params: KdParams) -> IndicatorResult<KdSeries> {
    let window = params.window;
    if window == 0 {
        return Err(IndicatorError::InvalidParameter(
            "윈도우는 0보다 커야 합니다".to_string(),
        ));
    }
    if bars.len() < window {
        return Err(IndicatorError::InsufficientData {
            required: window,
            provided: bars.len(),
        });
    }

    let hundred = dec!(100);
    let neutral = dec!(50);
    // alpha = 1/3 (center of mass 2)
    let alpha = Decimal::ONE / dec!(3);
    let one_minus_alpha = Decimal::ONE - alpha;

    let mut k = Vec::with_capacity(bars.len());
    let mut d = Vec::with_capacity(bars.len());
    let mut prev_k: Option<Decimal> = None;
    let mut prev_d: Option<Decimal> = None;

    for i in 0..bars.len() {
        let rsv = if i + 1 < window {
            neutral
        } else {
            let slice = &bars[i + 1 - window..=i];
            let high = slice.iter().map(|b| b.high).max().unwrap_or(bars[i].high);
            let low = slice.iter().map(|b| b.low).min().unwrap_or(bars[i].low);
            let range = high - low;
            if range == Decimal::ZERO {
                neutral
            } else {
                (bars[i].close - low) / range * hundred
            }
        };

        let curr_k = match prev_k {
            Some(pk) => one_minus_alpha * pk + alpha * rsv,
            None => rsv,
        };
        let curr_d = match prev_d {
            Some(pd) => one_minus_alpha * pd + alpha * curr_k,
            None => curr_k,
        };

        k.push(curr_k);
        d.push(curr_d);
        prev_k = Some(curr_k);
        prev_d = Some(curr_d);
    }

    Ok(KdSeries { k, d })
}

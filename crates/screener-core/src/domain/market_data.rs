//! 시장 데이터 타입 및 구조체.
//!
//! 이 모듈은 스크리닝에 사용되는 시장 데이터 타입을 정의합니다:
//! - `PriceBar` - OHLCV 일봉 데이터
//! - `PriceSeries` - 날짜 오름차순으로 정렬된 일봉 시퀀스
//! - `FlowRecord` - 법인(외국인/투신/자기매매) 매매 데이터
//! - `MarginRecord` - 신용거래(융자) 잔고 데이터

use crate::types::{Price, Quantity};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// OHLCV 일봉 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량 (주 단위)
    pub volume: Quantity,
}

impl PriceBar {
    /// 새 일봉을 생성합니다.
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Quantity,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 캔들 범위(고가 - 저가)를 반환합니다.
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// 양봉(종가 > 시가)인지 확인합니다.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 전일 종가 대비 등락률(%)을 반환합니다.
    ///
    /// 전일 종가가 0 이하이면 None.
    pub fn change_from(&self, prev_close: Price) -> Option<Decimal> {
        if prev_close <= Decimal::ZERO {
            return None;
        }
        Some((self.close - prev_close) / prev_close * Decimal::from(100))
    }
}

/// 날짜 오름차순으로 정렬된 일봉 시퀀스.
///
/// 생성 시 정렬 및 중복 제거가 수행되며, 이후에는 불변입니다.
/// 모든 윈도우 연산은 달력 날짜가 아닌 시퀀스 위치 기준으로 동작하므로
/// 휴장일 공백은 영향을 주지 않습니다.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// 일봉 목록에서 시리즈를 생성합니다.
    ///
    /// 날짜 오름차순으로 정렬하고, 같은 날짜가 중복되면 뒤의 것을 유지합니다.
    pub fn from_bars(mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by(|next, prev| {
            if next.date == prev.date {
                *prev = next.clone();
                true
            } else {
                false
            }
        });
        Self { bars }
    }

    /// 일봉 개수를 반환합니다.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 전체 일봉 슬라이스를 반환합니다.
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// 마지막(최신) 일봉을 반환합니다.
    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// 종가 벡터를 반환합니다.
    pub fn closes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// 고가 벡터를 반환합니다.
    pub fn highs(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.high).collect()
    }

    /// 저가 벡터를 반환합니다.
    pub fn lows(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// 거래량 벡터를 반환합니다 (주 단위).
    pub fn volumes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

/// 법인 투자자 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionalCategory {
    /// 외국인
    ForeignInvestor,
    /// 투신 (투자신탁)
    InvestmentTrust,
    /// 자기매매 (딜러)
    Dealer,
}

impl fmt::Display for InstitutionalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstitutionalCategory::ForeignInvestor => write!(f, "foreign_investor"),
            InstitutionalCategory::InvestmentTrust => write!(f, "investment_trust"),
            InstitutionalCategory::Dealer => write!(f, "dealer"),
        }
    }
}

/// 법인 매매 데이터 (1일 1분류).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// 거래일
    pub date: NaiveDate,
    /// 투자자 분류
    pub category: InstitutionalCategory,
    /// 매수 수량 (주 단위)
    pub buy: Quantity,
    /// 매도 수량 (주 단위)
    pub sell: Quantity,
}

impl FlowRecord {
    /// 순매수(매수 - 매도)를 반환합니다 (주 단위).
    pub fn net(&self) -> Decimal {
        self.buy - self.sell
    }
}

/// 신용거래(융자) 잔고 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginRecord {
    /// 거래일
    pub date: NaiveDate,
    /// 융자 잔고 (주 단위)
    pub balance: Quantity,
    /// 융자 한도 (주 단위)
    pub limit: Quantity,
}

impl MarginRecord {
    /// 융자 사용률(%)을 반환합니다.
    ///
    /// 한도가 0 이하이면 None.
    pub fn utilization_pct(&self) -> Option<Decimal> {
        if self.limit <= Decimal::ZERO {
            return None;
        }
        Some(self.balance / self.limit * Decimal::from(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar(day: u32, close: Decimal) -> PriceBar {
        PriceBar::new(
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            close,
            close + dec!(1),
            close - dec!(1),
            close,
            dec!(1000),
        )
    }

    #[test]
    fn test_series_sorts_ascending() {
        let series = PriceSeries::from_bars(vec![bar(3, dec!(102)), bar(1, dec!(100)), bar(2, dec!(101))]);
        let dates: Vec<NaiveDate> = series.bars().iter().map(|b| b.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
        assert_eq!(series.latest().unwrap().close, dec!(102));
    }

    #[test]
    fn test_series_dedups_by_date_keeping_last() {
        let mut dup = bar(2, dec!(50));
        dup.volume = dec!(9999);
        let series = PriceSeries::from_bars(vec![bar(1, dec!(100)), bar(2, dec!(101)), dup]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().unwrap().volume, dec!(9999));
    }

    #[test]
    fn test_change_from_guards_zero_prev_close() {
        let b = bar(1, dec!(110));
        assert_eq!(b.change_from(dec!(100)), Some(dec!(10)));
        assert_eq!(b.change_from(Decimal::ZERO), None);
    }

    #[test]
    fn test_flow_record_net() {
        let record = FlowRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            category: InstitutionalCategory::InvestmentTrust,
            buy: dec!(800_000),
            sell: dec!(300_000),
        };
        assert_eq!(record.net(), dec!(500_000));
    }

    #[test]
    fn test_margin_utilization() {
        let record = MarginRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            balance: dec!(250),
            limit: dec!(1000),
        };
        assert_eq!(record.utilization_pct(), Some(dec!(25)));

        let no_limit = MarginRecord {
            limit: Decimal::ZERO,
            ..record
        };
        assert_eq!(no_limit.utilization_pct(), None);
    }
}

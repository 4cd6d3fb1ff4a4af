//! 종목 식별자 및 시장 구분 정의.
//!
//! 이 모듈은 스크리닝 대상 종목 관련 타입을 정의합니다:
//! - `MarketKind` - 시장 구분 (상장/장외/신흥)
//! - `InstrumentId` - 거래소 티커 기반 종목 식별자

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 거래량/수량 타입.
pub type Quantity = Decimal;

/// 퍼센트 타입 (1.5 = 1.5%).
pub type Percent = Decimal;

/// 시장 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketKind {
    /// 거래소 상장 (TWSE)
    Twse,
    /// 장외 시장 (OTC)
    Otc,
    /// 신흥 시장 (Emerging)
    Emerging,
}

impl fmt::Display for MarketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketKind::Twse => write!(f, "twse"),
            MarketKind::Otc => write!(f, "otc"),
            MarketKind::Emerging => write!(f, "emerging"),
        }
    }
}

/// 종목 식별자.
///
/// 거래소 티커 문자열(예: "2330")을 감싸는 불변 식별자입니다.
/// 인덱스 등 위치 기반 값은 식별자로 사용하지 않으며, 외부 데이터의
/// 위치 정보는 수집 시점에 한 번만 티커 문자열로 변환합니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(String);

impl InstrumentId {
    /// 새 종목 식별자를 생성합니다.
    ///
    /// 앞뒤 공백은 수집 시점에 제거됩니다.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self(ticker.into().trim().to_string())
    }

    /// 티커 문자열을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InstrumentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

//! 메트릭 해석 결과 및 종목 스냅샷.
//!
//! 이 모듈은 폴백 체인을 거쳐 해석된 값과 그 출처를 정의합니다:
//! - `MetricKind` - 스칼라 메트릭 종류
//! - `MetricSource` - 값의 출처 (1순위/2순위/기본값)
//! - `ResolvedMetric` - 출처가 태깅된 해석 결과 (값은 항상 존재)
//! - `InstrumentFlags` - 경고/처치 지정 여부
//! - `InstrumentSnapshot` - 한 종목의 해석 완료된 데이터 집합

use crate::domain::market_data::{FlowRecord, MarginRecord, PriceSeries};
use crate::types::{InstrumentId, MarketKind};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 폴백 체인으로 해석되는 스칼라 메트릭 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// 주당순이익
    Eps,
    /// 자기자본이익률 (%)
    Roe,
    /// 배당수익률 (%)
    DividendYield,
    /// 투신 지분율 (%)
    TrustHoldingPct,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Eps => write!(f, "eps"),
            MetricKind::Roe => write!(f, "roe"),
            MetricKind::DividendYield => write!(f, "dividend_yield"),
            MetricKind::TrustHoldingPct => write!(f, "trust_holding_pct"),
        }
    }
}

/// 해석된 값의 출처.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSource {
    /// 체인 1순위 제공자
    Primary,
    /// 2순위 이하 제공자
    Secondary,
    /// 정적 기본값 테이블
    Default,
}

impl fmt::Display for MetricSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricSource::Primary => write!(f, "primary"),
            MetricSource::Secondary => write!(f, "secondary"),
            MetricSource::Default => write!(f, "default"),
        }
    }
}

/// 출처가 태깅된 메트릭 해석 결과.
///
/// `value`는 항상 존재합니다. 실데이터 부재는 `source == Default`로
/// 표현하며, 값 자체가 비는 경우는 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMetric<T> {
    /// 해석된 값
    pub value: T,
    /// 값의 출처
    pub source: MetricSource,
    /// 해석 시각
    pub resolved_at: DateTime<Utc>,
}

impl<T> ResolvedMetric<T> {
    /// 새 해석 결과를 생성합니다.
    pub fn new(value: T, source: MetricSource) -> Self {
        Self {
            value,
            source,
            resolved_at: Utc::now(),
        }
    }

    /// 기본값 폴백 여부를 반환합니다.
    pub fn is_default(&self) -> bool {
        self.source == MetricSource::Default
    }
}

/// 경고/처치 지정 여부.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstrumentFlags {
    /// 경고 종목 지정 여부
    pub is_warning: bool,
    /// 처치 종목 지정 여부
    pub is_disposition: bool,
}

/// 한 종목의 해석 완료된 데이터 집합.
///
/// 스크리닝 1회당 종목별로 한 번 생성되며, 조건 평가가 시작된 이후에는
/// 읽기 전용으로만 전달됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentSnapshot {
    /// 종목 식별자
    pub id: InstrumentId,
    /// 시장 구분
    pub market: MarketKind,
    /// 일봉 시리즈
    pub prices: PriceSeries,
    /// 법인 매매 기록 (날짜 오름차순)
    pub flows: Vec<FlowRecord>,
    /// 융자 잔고 기록 (날짜 오름차순)
    pub margins: Vec<MarginRecord>,
    /// 주당순이익
    pub eps: ResolvedMetric<Decimal>,
    /// 자기자본이익률 (%)
    pub roe: ResolvedMetric<Decimal>,
    /// 배당수익률 (%)
    pub dividend_yield: ResolvedMetric<Decimal>,
    /// 투신 지분율 (%)
    pub trust_holding_pct: ResolvedMetric<Decimal>,
    /// 경고/처치 지정 여부
    pub flags: InstrumentFlags,
    /// 플래그 출처 (제공자 실패 시 Default = 미지정 가정)
    pub flags_source: MetricSource,
}

impl InstrumentSnapshot {
    /// 스칼라 메트릭 하나라도 기본값으로 폴백했는지 확인합니다.
    ///
    /// 스크리닝 결과의 품질 감사(기본값 의존 종목 수 집계)에 사용됩니다.
    pub fn used_default_metric(&self) -> bool {
        self.eps.is_default()
            || self.roe.is_default()
            || self.dividend_yield.is_default()
            || self.trust_holding_pct.is_default()
    }

    /// 종류별 스칼라 메트릭을 반환합니다.
    pub fn scalar(&self, kind: MetricKind) -> &ResolvedMetric<Decimal> {
        match kind {
            MetricKind::Eps => &self.eps,
            MetricKind::Roe => &self.roe,
            MetricKind::DividendYield => &self.dividend_yield,
            MetricKind::TrustHoldingPct => &self.trust_holding_pct,
        }
    }
}

//! 데이터 제공자 capability 모듈.
//!
//! 해석기가 소비하는 제공자 인터페이스를 정의합니다. 실제 벤더별 HTTP
//! 클라이언트는 이 trait들을 구현하여 주입되며, 이 crate는 원시 바이트
//! 수집을 구현하지 않습니다.
//!
//! ## Capability trait
//! - `PriceSeriesProvider` - OHLCV 일봉 시리즈
//! - `InstitutionalFlowProvider` - 법인(외국인/투신/딜러) 매매 데이터
//! - `MarginDataProvider` - 신용거래(융자) 잔고 데이터
//! - `FinancialFactsProvider` - 재무 지표 (EPS/ROE/배당수익률)
//! - `InstrumentFlagProvider` - 경고/처치 지정 여부
//! - `ScalarMetricProvider` - 폴백 체인의 단위가 되는 스칼라 메트릭 소스
//!
//! ## 기본값 테이블
//! - `DefaultValueTable` - 순수 로컬 테이블, 체인 소진 시 최종 폴백

pub mod defaults;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{DataError, Result};
use screener_core::{
    FlowRecord, InstrumentFlags, InstrumentId, MarginRecord, MetricKind, PriceSeries,
};

pub use defaults::DefaultValueTable;

/// OHLCV 일봉 시리즈 제공자.
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// 제공자 이름 (로그용).
    fn name(&self) -> &str;

    /// 기간 내 일봉 시리즈를 가져옵니다.
    async fn fetch_price_series(
        &self,
        id: &InstrumentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries>;
}

/// 법인 매매 데이터 제공자.
#[async_trait]
pub trait InstitutionalFlowProvider: Send + Sync {
    /// 제공자 이름 (로그용).
    fn name(&self) -> &str;

    /// 기간 내 법인 매매 기록을 날짜 오름차순으로 가져옵니다.
    async fn fetch_institutional_flow(
        &self,
        id: &InstrumentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<FlowRecord>>;
}

/// 신용거래(융자) 데이터 제공자.
#[async_trait]
pub trait MarginDataProvider: Send + Sync {
    /// 제공자 이름 (로그용).
    fn name(&self) -> &str;

    /// 기간 내 융자 잔고 기록을 날짜 오름차순으로 가져옵니다.
    async fn fetch_margin_data(
        &self,
        id: &InstrumentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MarginRecord>>;
}

/// 재무 지표 묶음.
///
/// 제공자가 보유한 필드만 채워집니다. 누락 필드는 해당 메트릭에 대한
/// "데이터 없음"으로 취급되어 체인의 다음 제공자로 넘어갑니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialFacts {
    /// 주당순이익
    pub eps: Option<Decimal>,
    /// 자기자본이익률 (%)
    pub roe: Option<Decimal>,
    /// 배당수익률 (%)
    pub dividend_yield: Option<Decimal>,
}

/// 재무 지표 제공자.
#[async_trait]
pub trait FinancialFactsProvider: Send + Sync {
    /// 제공자 이름 (로그용).
    fn name(&self) -> &str;

    /// 종목의 재무 지표를 가져옵니다.
    async fn fetch_financial_facts(&self, id: &InstrumentId) -> Result<FinancialFacts>;
}

/// 경고/처치 지정 여부 제공자.
#[async_trait]
pub trait InstrumentFlagProvider: Send + Sync {
    /// 제공자 이름 (로그용).
    fn name(&self) -> &str;

    /// 종목의 경고/처치 지정 여부를 가져옵니다.
    async fn fetch_instrument_flags(&self, id: &InstrumentId) -> Result<InstrumentFlags>;
}

/// 스칼라 메트릭 소스.
///
/// 메트릭 종류별 폴백 체인의 단위입니다. 해석기는 체인을 순서대로
/// 시도하며, 각 소스는 검증 전의 원시 값을 반환합니다.
#[async_trait]
pub trait ScalarMetricProvider: Send + Sync {
    /// 제공자 이름 (로그용).
    fn name(&self) -> &str;

    /// 종목의 스칼라 메트릭 값을 가져옵니다.
    async fn fetch(&self, kind: MetricKind, id: &InstrumentId) -> Result<Decimal>;
}

/// `FinancialFactsProvider`를 스칼라 메트릭 소스로 변환하는 어댑터.
///
/// EPS/ROE/배당수익률 체인에서 재무 지표 제공자를 재사용할 수 있게
/// 합니다. 요청한 종류의 필드가 비어 있으면 `NoData`를 반환합니다.
pub struct FinancialFactsMetricSource {
    inner: Arc<dyn FinancialFactsProvider>,
}

impl FinancialFactsMetricSource {
    /// 새 어댑터를 생성합니다.
    pub fn new(inner: Arc<dyn FinancialFactsProvider>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ScalarMetricProvider for FinancialFactsMetricSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, kind: MetricKind, id: &InstrumentId) -> Result<Decimal> {
        let facts = self.inner.fetch_financial_facts(id).await?;
        let value = match kind {
            MetricKind::Eps => facts.eps,
            MetricKind::Roe => facts.roe,
            MetricKind::DividendYield => facts.dividend_yield,
            MetricKind::TrustHoldingPct => None,
        };
        value.ok_or_else(|| {
            DataError::NoData(format!(
                "{} not present in financial facts for {}",
                kind, id
            ))
        })
    }
}

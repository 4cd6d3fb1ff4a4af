//! 메트릭 해석기.
//!
//! 종목 식별자를 받아 필요한 모든 메트릭을 우선순위 폴백 체인으로
//! 해석합니다.
//!
//! # 동작 흐름
//!
//! ```text
//! resolve_scalar(kind, id)
//!         │
//!         ▼
//! ┌──────────────────┐
//! │ 1. 캐시 조회      │ ← TTL 이내면 즉시 반환
//! └────────┬─────────┘
//!          │ miss
//! ┌────────▼─────────┐
//! │ 2. 체인 순회      │ ← 제공자별: 스로틀 → 타임아웃 → 재시도 → 검증
//! └────────┬─────────┘
//!          │ 전부 실패
//! ┌────────▼─────────┐
//! │ 3. 기본값 테이블  │ ← 항상 성공, source = Default
//! └──────────────────┘
//! ```
//!
//! 제공자 실패는 호출자에게 전파되지 않습니다. 일시적 오류(타임아웃,
//! 연결 실패, 호출 한도)만 지수 백오프로 재시도하며, 구조적 오류(형식
//! 오류, 데이터 없음, 검증 탈락)는 즉시 다음 제공자로 넘어갑니다.

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use chrono_tz::Asia::Taipei;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::MetricCache;
use crate::error::{DataError, Result};
use crate::provider::{
    DefaultValueTable, InstitutionalFlowProvider, InstrumentFlagProvider, MarginDataProvider,
    PriceSeriesProvider, ScalarMetricProvider,
};
use crate::throttle::RequestThrottle;
use screener_core::{
    FlowRecord, InstrumentFlags, InstrumentId, InstrumentSnapshot, MarginRecord, MarketKind,
    MetricKind, MetricSource, PriceSeries, ResolvedMetric,
};

/// 일시적 오류 재시도 정책.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// 제공자당 최대 시도 횟수
    pub max_attempts: u32,
    /// 첫 재시도 전 대기 시간 (이후 지수 증가)
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// n번째 재시도 전 대기 시간을 반환합니다 (attempt는 1부터).
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// 제공자 원시 값 검증.
///
/// 0 이하의 값은 "데이터 없음"의 침묵 신호인 경우가 많아 유효한 값으로
/// 받지 않고 제공자 실패로 처리합니다. 0으로 스크리닝하는 사고를 막기
/// 위한 정책입니다.
fn validate_scalar(kind: MetricKind, value: Decimal) -> Result<Decimal> {
    let in_range = match kind {
        MetricKind::Eps | MetricKind::Roe => value > Decimal::ZERO,
        MetricKind::DividendYield | MetricKind::TrustHoldingPct => {
            value > Decimal::ZERO && value <= Decimal::from(100)
        }
    };
    if in_range {
        Ok(value)
    } else {
        Err(DataError::ValidationRejected(format!(
            "{} value {} out of accepted range",
            kind, value
        )))
    }
}

/// 타이베이 기준 오늘 날짜를 반환합니다.
///
/// 조회 구간 계산은 UTC가 아닌 시장 현지 날짜를 기준으로 합니다.
fn market_today() -> NaiveDate {
    Utc::now().with_timezone(&Taipei).date_naive()
}

/// 종류별 폴백 체인을 가진 메트릭 해석기.
///
/// 공유 캐시와 스로틀을 소유하며, 종목 단위 병렬 해석에서 공유해도
/// 안전합니다 (`Arc<MetricResolver>`).
pub struct MetricResolver {
    scalar_chains: HashMap<MetricKind, Vec<Arc<dyn ScalarMetricProvider>>>,
    price_providers: Vec<Arc<dyn PriceSeriesProvider>>,
    flow_providers: Vec<Arc<dyn InstitutionalFlowProvider>>,
    margin_providers: Vec<Arc<dyn MarginDataProvider>>,
    flag_providers: Vec<Arc<dyn InstrumentFlagProvider>>,
    defaults: DefaultValueTable,
    cache: MetricCache,
    throttle: RequestThrottle,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl MetricResolver {
    /// 빌더를 반환합니다.
    pub fn builder() -> MetricResolverBuilder {
        MetricResolverBuilder::new()
    }

    /// 캐시 참조를 반환합니다 (통계 조회용).
    pub fn cache(&self) -> &MetricCache {
        &self.cache
    }

    /// 스칼라 메트릭을 해석합니다.
    ///
    /// 항상 값을 반환합니다. 체인이 모두 실패하면 기본값 테이블로
    /// 폴백하며, 그 사실은 `source == Default`로 드러납니다.
    pub async fn resolve_scalar(
        &self,
        kind: MetricKind,
        id: &InstrumentId,
    ) -> ResolvedMetric<Decimal> {
        if let Some((value, source)) = self.cache.get(kind, id).await {
            return ResolvedMetric::new(value, source);
        }

        let chain = self.scalar_chains.get(&kind).map(Vec::as_slice).unwrap_or(&[]);

        for (position, provider) in chain.iter().enumerate() {
            let outcome = self
                .call_with_retry(provider.name(), || provider.fetch(kind, id))
                .await
                .and_then(|raw| validate_scalar(kind, raw));

            match outcome {
                Ok(value) => {
                    let source = if position == 0 {
                        MetricSource::Primary
                    } else {
                        MetricSource::Secondary
                    };
                    self.cache.insert(kind, id, value, source).await;
                    info!(
                        metric = %kind,
                        instrument = %id,
                        provider = provider.name(),
                        value = %value,
                        source = %source,
                        "스칼라 메트릭 해석 완료"
                    );
                    return ResolvedMetric::new(value, source);
                }
                Err(e) => {
                    warn!(
                        metric = %kind,
                        instrument = %id,
                        provider = provider.name(),
                        error = %e,
                        "제공자 실패, 다음 제공자로 진행"
                    );
                }
            }
        }

        let value = self.defaults.lookup(kind, id);
        info!(
            metric = %kind,
            instrument = %id,
            value = %value,
            "체인 소진, 기본값 사용"
        );
        ResolvedMetric::new(value, MetricSource::Default)
    }

    /// 일봉 시리즈를 해석합니다.
    ///
    /// 가격 시리즈에는 기본값 폴백이 없습니다. 체인이 모두 실패하면
    /// 종목 단위 실패로 호출자에게 전파됩니다.
    pub async fn resolve_price_series(
        &self,
        id: &InstrumentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries> {
        for provider in &self.price_providers {
            let outcome = self
                .call_with_retry(provider.name(), || {
                    provider.fetch_price_series(id, start, end)
                })
                .await
                .and_then(|series| {
                    if series.is_empty() {
                        Err(DataError::NoData(format!("empty price series for {}", id)))
                    } else {
                        Ok(series)
                    }
                });

            match outcome {
                Ok(series) => {
                    debug!(
                        instrument = %id,
                        provider = provider.name(),
                        bars = series.len(),
                        "일봉 시리즈 해석 완료"
                    );
                    return Ok(series);
                }
                Err(e) => {
                    warn!(
                        instrument = %id,
                        provider = provider.name(),
                        error = %e,
                        "가격 제공자 실패, 다음 제공자로 진행"
                    );
                }
            }
        }

        Err(DataError::NoData(format!(
            "all price providers exhausted for {}",
            id
        )))
    }

    /// 법인 매매 기록을 해석합니다.
    ///
    /// 체인이 모두 실패하면 빈 벡터로 완화됩니다. 수급 조건은 이후
    /// 판정 단계에서 N/A 실패로 기록됩니다.
    pub async fn resolve_flows(
        &self,
        id: &InstrumentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<FlowRecord> {
        for provider in &self.flow_providers {
            match self
                .call_with_retry(provider.name(), || {
                    provider.fetch_institutional_flow(id, start, end)
                })
                .await
            {
                Ok(mut records) => {
                    records.sort_by_key(|r| r.date);
                    return records;
                }
                Err(e) => {
                    warn!(
                        instrument = %id,
                        provider = provider.name(),
                        error = %e,
                        "수급 제공자 실패, 다음 제공자로 진행"
                    );
                }
            }
        }

        debug!(instrument = %id, "수급 데이터 없음, 빈 시리즈로 완화");
        Vec::new()
    }

    /// 융자 잔고 기록을 해석합니다.
    ///
    /// 실패 시 빈 벡터로 완화됩니다.
    pub async fn resolve_margin(
        &self,
        id: &InstrumentId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<MarginRecord> {
        for provider in &self.margin_providers {
            match self
                .call_with_retry(provider.name(), || provider.fetch_margin_data(id, start, end))
                .await
            {
                Ok(mut records) => {
                    records.sort_by_key(|r| r.date);
                    return records;
                }
                Err(e) => {
                    warn!(
                        instrument = %id,
                        provider = provider.name(),
                        error = %e,
                        "신용 제공자 실패, 다음 제공자로 진행"
                    );
                }
            }
        }

        debug!(instrument = %id, "신용 데이터 없음, 빈 시리즈로 완화");
        Vec::new()
    }

    /// 경고/처치 플래그를 해석합니다.
    ///
    /// 플래그 소스가 없으면 "미지정"으로 완화합니다(fail-open). 과잉
    /// 제외를 피하기 위한 보수적 기본값이며, 출처 `Default`로 기록되어
    /// 감사 시 구분됩니다.
    pub async fn resolve_flags(&self, id: &InstrumentId) -> (InstrumentFlags, MetricSource) {
        for (position, provider) in self.flag_providers.iter().enumerate() {
            match self
                .call_with_retry(provider.name(), || provider.fetch_instrument_flags(id))
                .await
            {
                Ok(flags) => {
                    let source = if position == 0 {
                        MetricSource::Primary
                    } else {
                        MetricSource::Secondary
                    };
                    return (flags, source);
                }
                Err(e) => {
                    warn!(
                        instrument = %id,
                        provider = provider.name(),
                        error = %e,
                        "플래그 제공자 실패, 다음 제공자로 진행"
                    );
                }
            }
        }

        (InstrumentFlags::default(), MetricSource::Default)
    }

    /// 종목 스냅샷을 해석합니다.
    ///
    /// 조회 구간은 타이베이 기준 오늘부터 `lookback_days`일 전까지입니다.
    /// 가격 시리즈 실패만 오류로 전파되며, 나머지는 기본값/빈 시리즈로
    /// 완화됩니다.
    pub async fn resolve_snapshot(
        &self,
        id: &InstrumentId,
        market: MarketKind,
        lookback_days: i64,
    ) -> Result<InstrumentSnapshot> {
        let end = market_today();
        let start = end - ChronoDuration::days(lookback_days);

        let prices = self.resolve_price_series(id, start, end).await?;
        let flows = self.resolve_flows(id, start, end).await;
        let margins = self.resolve_margin(id, start, end).await;

        let eps = self.resolve_scalar(MetricKind::Eps, id).await;
        let roe = self.resolve_scalar(MetricKind::Roe, id).await;
        let dividend_yield = self.resolve_scalar(MetricKind::DividendYield, id).await;
        let trust_holding_pct = self.resolve_scalar(MetricKind::TrustHoldingPct, id).await;
        let (flags, flags_source) = self.resolve_flags(id).await;

        Ok(InstrumentSnapshot {
            id: id.clone(),
            market,
            prices,
            flows,
            margins,
            eps,
            roe,
            dividend_yield,
            trust_holding_pct,
            flags,
            flags_source,
        })
    }

    /// 스로틀/타임아웃/재시도를 적용하여 제공자를 호출합니다.
    ///
    /// 일시적 오류만 재시도합니다. 구조적 오류는 첫 시도에서 그대로
    /// 반환되어 폴백 체인이 즉시 전진합니다.
    async fn call_with_retry<T, F, Fut>(&self, provider_name: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            self.throttle.acquire().await;

            let outcome = match tokio::time::timeout(self.call_timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(DataError::Timeout(format!(
                    "{} exceeded {}ms",
                    provider_name,
                    self.call_timeout.as_millis()
                ))),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    debug!(
                        provider = provider_name,
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "일시적 오류, 재시도 예정"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// `MetricResolver` 빌더.
pub struct MetricResolverBuilder {
    scalar_chains: HashMap<MetricKind, Vec<Arc<dyn ScalarMetricProvider>>>,
    price_providers: Vec<Arc<dyn PriceSeriesProvider>>,
    flow_providers: Vec<Arc<dyn InstitutionalFlowProvider>>,
    margin_providers: Vec<Arc<dyn MarginDataProvider>>,
    flag_providers: Vec<Arc<dyn InstrumentFlagProvider>>,
    defaults: DefaultValueTable,
    cache_ttl: ChronoDuration,
    throttle_interval: Duration,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl MetricResolverBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            scalar_chains: HashMap::new(),
            price_providers: Vec::new(),
            flow_providers: Vec::new(),
            margin_providers: Vec::new(),
            flag_providers: Vec::new(),
            defaults: DefaultValueTable::default(),
            cache_ttl: ChronoDuration::seconds(3600),
            throttle_interval: Duration::from_millis(300),
            retry: RetryPolicy::default(),
            call_timeout: Duration::from_secs(10),
        }
    }

    /// 스칼라 체인에 제공자를 추가합니다 (추가 순서 = 우선순위).
    pub fn add_scalar_provider(
        mut self,
        kind: MetricKind,
        provider: Arc<dyn ScalarMetricProvider>,
    ) -> Self {
        self.scalar_chains.entry(kind).or_default().push(provider);
        self
    }

    /// 가격 제공자를 추가합니다.
    pub fn add_price_provider(mut self, provider: Arc<dyn PriceSeriesProvider>) -> Self {
        self.price_providers.push(provider);
        self
    }

    /// 수급 제공자를 추가합니다.
    pub fn add_flow_provider(mut self, provider: Arc<dyn InstitutionalFlowProvider>) -> Self {
        self.flow_providers.push(provider);
        self
    }

    /// 신용 제공자를 추가합니다.
    pub fn add_margin_provider(mut self, provider: Arc<dyn MarginDataProvider>) -> Self {
        self.margin_providers.push(provider);
        self
    }

    /// 플래그 제공자를 추가합니다.
    pub fn add_flag_provider(mut self, provider: Arc<dyn InstrumentFlagProvider>) -> Self {
        self.flag_providers.push(provider);
        self
    }

    /// 기본값 테이블을 설정합니다.
    pub fn with_defaults(mut self, defaults: DefaultValueTable) -> Self {
        self.defaults = defaults;
        self
    }

    /// 캐시 TTL을 설정합니다.
    pub fn with_cache_ttl(mut self, ttl: ChronoDuration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// 스로틀 최소 간격을 설정합니다.
    pub fn with_throttle_interval(mut self, interval: Duration) -> Self {
        self.throttle_interval = interval;
        self
    }

    /// 재시도 정책을 설정합니다.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// 제공자 호출 타임아웃을 설정합니다.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// 해석기를 생성합니다.
    pub fn build(self) -> MetricResolver {
        MetricResolver {
            scalar_chains: self.scalar_chains,
            price_providers: self.price_providers,
            flow_providers: self.flow_providers,
            margin_providers: self.margin_providers,
            flag_providers: self.flag_providers,
            defaults: self.defaults,
            cache: MetricCache::with_ttl(self.cache_ttl),
            throttle: RequestThrottle::with_interval(self.throttle_interval),
            retry: self.retry,
            call_timeout: self.call_timeout,
        }
    }
}

impl Default for MetricResolverBuilder {
    fn default() -> Self {
        Self::new()
    }
}

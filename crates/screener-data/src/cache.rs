//! TTL 기반 메트릭 캐시.
//!
//! (메트릭 종류, 종목) 키로 해석 결과를 보관합니다. 투신 지분율처럼
//! 원천 데이터가 주 단위로 갱신되는 느린 메트릭의 중복 외부 호출을
//! 줄이는 것이 목적입니다.
//!
//! - 엔트리는 TTL 경과 시 조회 시점에 만료 처리되며, 능동적 무효화는
//!   하지 않습니다.
//! - 쓰기는 키 기준 멱등 upsert이므로 같은 종목의 동시 해석에도
//!   RwLock 이상의 잠금이 필요 없습니다.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use screener_core::{InstrumentId, MetricKind, MetricSource};

/// 캐시 엔트리.
#[derive(Debug, Clone, Copy)]
struct CachedMetric {
    value: Decimal,
    source: MetricSource,
    expires_at: DateTime<Utc>,
}

/// 캐시 통계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// 캐시 적중 수
    pub hits: u64,
    /// 캐시 미스 수
    pub misses: u64,
    /// 삽입 수
    pub insertions: u64,
}

/// (메트릭 종류, 종목) 키의 TTL 캐시.
pub struct MetricCache {
    entries: RwLock<HashMap<(MetricKind, InstrumentId), CachedMetric>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    insertions: AtomicU64,
}

impl MetricCache {
    /// 기본 TTL(1시간)로 캐시를 생성합니다.
    pub fn new() -> Self {
        Self::with_ttl(Duration::seconds(3600))
    }

    /// 지정한 TTL로 캐시를 생성합니다.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            insertions: AtomicU64::new(0),
        }
    }

    /// 만료되지 않은 엔트리를 조회합니다.
    pub async fn get(
        &self,
        kind: MetricKind,
        id: &InstrumentId,
    ) -> Option<(Decimal, MetricSource)> {
        let key = (kind, id.clone());
        let entries = self.entries.read().await;
        match entries.get(&key) {
            Some(entry) if entry.expires_at > Utc::now() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(metric = %kind, instrument = %id, "metric cache hit");
                Some((entry.value, entry.source))
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// 해석 결과를 upsert합니다.
    pub async fn insert(
        &self,
        kind: MetricKind,
        id: &InstrumentId,
        value: Decimal,
        source: MetricSource,
    ) {
        let entry = CachedMetric {
            value,
            source,
            expires_at: Utc::now() + self.ttl,
        };
        let mut entries = self.entries.write().await;
        entries.insert((kind, id.clone()), entry);
        self.insertions.fetch_add(1, Ordering::Relaxed);
    }

    /// 만료된 엔트리를 정리하고 제거한 개수를 반환합니다.
    pub async fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// 현재 엔트리 수를 반환합니다.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// 비어 있는지 확인합니다.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// 전체 엔트리를 비웁니다.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// 누적 통계를 반환합니다.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            insertions: self.insertions.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricCache {
    fn default() -> Self {
        Self::new()
    }
}

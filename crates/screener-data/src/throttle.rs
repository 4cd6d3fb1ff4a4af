//! 외부 호출 간격 제한.
//!
//! 모든 외부 호출이 공유하는 단일 직렬화 지점입니다. 마지막 호출 시각을
//! Mutex로 보호하여 최소 호출 간격을 보장하며, 종목 단위 병렬 해석에서도
//! 안전합니다.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// 최소 호출 간격을 강제하는 스로틀.
pub struct RequestThrottle {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    /// 기본 간격(300ms)으로 스로틀을 생성합니다.
    pub fn new() -> Self {
        Self::with_interval(Duration::from_millis(300))
    }

    /// 지정한 최소 간격으로 스로틀을 생성합니다.
    pub fn with_interval(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// 호출 차례를 획득합니다.
    ///
    /// 직전 호출로부터 최소 간격이 지나지 않았으면 남은 시간만큼 대기한
    /// 뒤 반환합니다. Mutex를 대기 중에도 유지하므로 여러 태스크가 동시에
    /// 호출해도 간격이 겹치지 않습니다.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let elapsed = prev.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                trace!(wait_ms = wait.as_millis() as u64, "throttling outbound request");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::new()
    }
}

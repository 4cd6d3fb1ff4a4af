//! 스크리닝 오케스트레이터.
//!
//! 종목 목록을 순회하며 해석 → 지표/조건 평가 → 점수 산출을 수행하고,
//! 정렬된 결과 리포트를 만듭니다.
//!
//! - 종목 하나의 실패는 로그로 남기고 배치를 계속 진행합니다. 실행은
//!   항상 완료되어 결과 목록과 품질 감사용 집계를 반환합니다.
//! - 중단 플래그는 종목 사이에서만 확인합니다. 진행 중인 종목은 완료
//!   또는 타임아웃까지 수행된 뒤 중단됩니다.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::EngineResult;
use crate::evaluator::ConditionEvaluator;
use crate::scorer::ScoringEngine;
use screener_data::MetricResolver;
use screener_core::{InstrumentId, MarketKind, ScreeningConfig, ScreeningRunReport};

/// 기본 가격 조회 구간 (일).
const DEFAULT_LOOKBACK_DAYS: i64 = 90;

/// 스크리닝 오케스트레이터.
pub struct ScreeningOrchestrator {
    resolver: Arc<MetricResolver>,
    evaluator: ConditionEvaluator,
    scorer: ScoringEngine,
    lookback_days: i64,
    stop: Arc<AtomicBool>,
}

impl ScreeningOrchestrator {
    /// 새 오케스트레이터를 생성합니다.
    pub fn new(resolver: Arc<MetricResolver>) -> Self {
        Self {
            resolver,
            evaluator: ConditionEvaluator::new(),
            scorer: ScoringEngine::new(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 가격 조회 구간을 설정합니다.
    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    /// 커스텀 점수 엔진을 설정합니다.
    pub fn with_scorer(mut self, scorer: ScoringEngine) -> Self {
        self.scorer = scorer;
        self
    }

    /// 협조적 중단용 핸들을 반환합니다.
    ///
    /// `true`로 설정하면 현재 종목 처리 완료 후 배치가 중단됩니다.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// 종목 목록을 스크리닝합니다.
    ///
    /// 설정은 실행 전에 한 번 검증되며 실행 중 변경되지 않습니다.
    /// 반환되는 결과는 총점 내림차순(동점이면 통과 조건 수 내림차순,
    /// 그 다음 종목 코드 오름차순)으로 정렬됩니다.
    pub async fn run(
        &self,
        instruments: &[(InstrumentId, MarketKind)],
        config: &ScreeningConfig,
    ) -> EngineResult<ScreeningRunReport> {
        config.validate()?;

        let mut report = ScreeningRunReport::default();

        info!(
            total = instruments.len(),
            min_conditions = config.min_conditions_to_pass,
            enabled_conditions = config.enabled_condition_count(),
            "스크리닝 시작"
        );

        for (id, market) in instruments {
            if self.stop.load(Ordering::Relaxed) {
                info!(
                    processed = report.instruments_processed,
                    remaining = instruments.len() - report.instruments_processed,
                    "중단 플래그 감지, 배치 중단"
                );
                break;
            }

            match self
                .resolver
                .resolve_snapshot(id, *market, self.lookback_days)
                .await
            {
                Ok(snapshot) => {
                    if snapshot.used_default_metric() {
                        report.instruments_with_defaults += 1;
                    }

                    let mut result = self.evaluator.evaluate(&snapshot, config);
                    self.scorer.score(&mut result);

                    debug!(
                        instrument = %id,
                        matched = result.matched_count,
                        score = result.total_score,
                        grade = %result.grade,
                        "종목 처리 완료"
                    );

                    report.instruments_processed += 1;
                    report.results.push(result);
                }
                Err(e) => {
                    warn!(
                        instrument = %id,
                        error = %e,
                        "종목 처리 실패, 배치 계속 진행"
                    );
                    report.instruments_processed += 1;
                    report.instruments_failed += 1;
                }
            }
        }

        report.results.sort_by(|a, b| {
            b.total_score
                .cmp(&a.total_score)
                .then(b.matched_count.cmp(&a.matched_count))
                .then(a.instrument_id.cmp(&b.instrument_id))
        });

        info!(
            processed = report.instruments_processed,
            failed = report.instruments_failed,
            with_defaults = report.instruments_with_defaults,
            passed = report.results.iter().filter(|r| r.passed).count(),
            "스크리닝 완료"
        );

        Ok(report)
    }
}

//! 결과 불변식 속성 테스트.
//!
//! 임의의 판정 조합에 대해 다음이 항상 성립한다:
//! - `matched_count`는 통과 판정 수와 같다
//! - `passed`는 `matched_count >= min_conditions_to_pass`와 동치다
//! - 총점은 100을 넘지 않으며 등급 사다리와 일치한다

use proptest::prelude::*;
use std::collections::BTreeMap;

use screener_analytics::ScoringEngine;
use screener_core::{ConditionKey, ConditionVerdict, Grade, InstrumentId, ScreeningResult};

fn arb_verdicts() -> impl Strategy<Value = BTreeMap<ConditionKey, ConditionVerdict>> {
    // 조건별로 (포함 여부, 통과 여부)를 뽑는다
    proptest::collection::vec(any::<(bool, bool)>(), ConditionKey::all().len()).prop_map(|picks| {
        ConditionKey::all()
            .iter()
            .zip(picks)
            .filter(|(_, (included, _))| *included)
            .map(|(&key, (_, passed))| (key, ConditionVerdict::new(passed, "prop")))
            .collect()
    })
}

proptest! {
    #[test]
    fn matched_count_equals_passed_verdicts(
        verdicts in arb_verdicts(),
        min_conditions in 0usize..10,
    ) {
        let result = ScreeningResult::from_verdicts(
            InstrumentId::new("2330"),
            verdicts.clone(),
            min_conditions,
        );

        let passed_count = verdicts.values().filter(|v| v.passed).count();
        prop_assert_eq!(result.matched_count, passed_count);
        prop_assert_eq!(result.passed, passed_count >= min_conditions);
    }

    #[test]
    fn total_score_is_capped_and_grade_matches(verdicts in arb_verdicts()) {
        let mut result = ScreeningResult::from_verdicts(
            InstrumentId::new("2330"),
            verdicts,
            1,
        );
        ScoringEngine::new().score(&mut result);

        prop_assert!(result.total_score <= 100);
        prop_assert!(result.total_score <= result.base_score + result.combo_score);
        prop_assert_eq!(result.grade, Grade::from_score(result.total_score));

        // 통과 조건이 하나도 없으면 점수도 0
        if result.matched_count == 0 {
            prop_assert_eq!(result.total_score, 0);
        }
    }

    #[test]
    fn scoring_is_idempotent(verdicts in arb_verdicts()) {
        let mut first = ScreeningResult::from_verdicts(
            InstrumentId::new("2330"),
            verdicts,
            1,
        );
        let engine = ScoringEngine::new();
        engine.score(&mut first);
        let mut second = first.clone();
        engine.score(&mut second);
        prop_assert_eq!(first, second);
    }
}

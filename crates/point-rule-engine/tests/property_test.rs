//! 积分引擎性质测试

use point_engine::{EvaluationOptions, PointEngine, RuleSet, RuleStore, TransactionContext};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

const SEED_RULES: &str = include_str!("../../../data/seed_rules.json");

const BRANCHES: &[&str] = &["BR3444", "BR3456", "BR3458", "BR1111", "BR9999"];
const CATEGORIES: &[&str] = &["CT1001", "CT1002", "CT1003", "CT9999"];

fn seed_snapshot() -> Arc<RuleSet> {
    let store = RuleStore::new();
    store.load_from_json(SEED_RULES).unwrap();
    store.snapshot()
}

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn context_strategy() -> impl Strategy<Value = (Decimal, &'static str, Vec<&'static str>)> {
    (
        amount_strategy(),
        prop::sample::select(BRANCHES),
        prop::sample::subsequence(CATEGORIES, 0..=CATEGORIES.len()),
    )
}

proptest! {
    #[test]
    fn test_points_are_monotonic_in_amount(
        (amount, branch, categories) in context_strategy(),
        extra_cents in 0i64..1_000_000i64,
        stacking in any::<bool>(),
    ) {
        let snapshot = seed_snapshot();
        let engine = PointEngine::new(EvaluationOptions { stacking });
        let larger = amount + Decimal::new(extra_cents, 2);

        let low = engine
            .evaluate(&TransactionContext::new(amount, branch, categories.clone()), &snapshot)
            .unwrap();
        let high = engine
            .evaluate(&TransactionContext::new(larger, branch, categories), &snapshot)
            .unwrap();

        prop_assert!(low.points <= high.points, "{} -> {}, {} -> {}", amount, low.points, larger, high.points);
    }

    #[test]
    fn test_rule_below_min_amount_is_never_applied(
        (amount, branch, categories) in context_strategy(),
        stacking in any::<bool>(),
    ) {
        let snapshot = seed_snapshot();
        let engine = PointEngine::new(EvaluationOptions { stacking });
        let ctx = TransactionContext::new(amount, branch, categories);

        let result = engine.evaluate(&ctx, &snapshot).unwrap();

        for reward in &result.rewards {
            let rule = snapshot.get(&reward.rule_id).unwrap();
            prop_assert!(amount >= rule.conditions().min_amount);
            prop_assert_eq!(&rule.conditions().branch_id, &ctx.branch_id);
            prop_assert!(rule.conditions().category_ids.iter().any(|c| ctx.category_ids.contains(c)));
        }
    }

    #[test]
    fn test_stacking_never_below_best_of(
        (amount, branch, categories) in context_strategy(),
    ) {
        let snapshot = seed_snapshot();
        let ctx = TransactionContext::new(amount, branch, categories);

        let best = PointEngine::default().evaluate(&ctx, &snapshot).unwrap();
        let stacked = PointEngine::new(EvaluationOptions::stacking())
            .evaluate(&ctx, &snapshot)
            .unwrap();

        prop_assert!(best.points >= 0);
        prop_assert!(stacked.points >= best.points);
        prop_assert_eq!(best.candidates, stacked.candidates);
        prop_assert!(best.applied_rules.len() <= 1);
        prop_assert_eq!(stacked.applied_rules.len(), stacked.candidates);
    }

    #[test]
    fn test_evaluation_is_deterministic(
        (amount, branch, categories) in context_strategy(),
        stacking in any::<bool>(),
    ) {
        let snapshot = seed_snapshot();
        let engine = PointEngine::new(EvaluationOptions { stacking });
        let ctx = TransactionContext::new(amount, branch, categories);

        let first = engine.evaluate(&ctx, &snapshot).unwrap();
        let second = engine.evaluate(&ctx, &snapshot).unwrap();

        prop_assert_eq!(first, second);
    }
}

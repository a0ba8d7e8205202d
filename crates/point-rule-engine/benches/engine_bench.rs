//! 积分评估性能基准测试
//!
//! 覆盖种子规则集上的单次评估与大规模合成规则集上的匹配开销。

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use point_engine::{
    Conditions, EvaluationOptions, PointEngine, Reward, Rule, RuleSet, RuleStatus, RuleStore,
    TransactionContext,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::hint::black_box;

const SEED_RULES: &str = include_str!("../../../data/seed_rules.json");

fn seed_set() -> RuleSet {
    let store = RuleStore::new();
    store.load_from_json(SEED_RULES).unwrap();
    RuleSet::clone(&store.snapshot())
}

/// 生成合成规则集：每个门店 × 分类一条规则，三种类型轮换
fn synthetic_set(branches: usize, categories: usize) -> RuleSet {
    let mut rules = Vec::with_capacity(branches * categories);

    for b in 0..branches {
        for c in 0..categories {
            let reward = match (b + c) % 3 {
                0 => Reward::Ratio {
                    points_per_unit: 1,
                    ratio_unit: dec!(100),
                },
                1 => Reward::FixedPoint { points: 10 },
                _ => Reward::Percentage { percent: 5 },
            };
            rules.push(
                Rule::new(
                    format!("rule-{b}-{c}"),
                    format!("synthetic {b}/{c}"),
                    Conditions::new(
                        Decimal::new((c as i64 % 10) * 5000, 2),
                        format!("BR{b:04}"),
                        [format!("CT{c:04}")],
                    ),
                    reward,
                    RuleStatus::Active,
                )
                .unwrap(),
            );
        }
    }

    RuleSet::new(rules).unwrap()
}

fn bench_seed_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("seed_rules");
    let set = seed_set();
    let ctx = TransactionContext::new(dec!(600.00), "BR3444", ["CT1002", "CT1003"]);

    group.bench_function("best_of", |b| {
        let engine = PointEngine::default();
        b.iter(|| engine.evaluate(black_box(&ctx), black_box(&set)))
    });

    group.bench_function("stacking", |b| {
        let engine = PointEngine::new(EvaluationOptions::stacking());
        b.iter(|| engine.evaluate(black_box(&ctx), black_box(&set)))
    });

    group.finish();
}

fn bench_synthetic_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthetic_rules");
    let engine = PointEngine::new(EvaluationOptions::stacking());

    for branches in [10, 100, 1000] {
        let set = synthetic_set(branches, 20);
        let ctx = TransactionContext::new(
            dec!(1234.56),
            "BR0007",
            ["CT0001", "CT0005", "CT0013"],
        );

        group.bench_with_input(
            BenchmarkId::new("full_scan", set.len()),
            &set,
            |b, set| b.iter(|| engine.evaluate(black_box(&ctx), black_box(set))),
        );
        group.bench_with_input(
            BenchmarkId::new("branch_index", set.len()),
            &set,
            |b, set| b.iter(|| engine.evaluate_from_source(black_box(&ctx), black_box(set))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_seed_evaluation, bench_synthetic_scaling);
criterion_main!(benches);

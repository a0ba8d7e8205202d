//! 积分评估引擎
//!
//! 串联匹配、裁决与计算：交易上下文 → 候选规则 → 裁决策略 → 积分结果。
//! 引擎本身无状态、无 I/O，可以在任意多个线程上对同一快照并发调用。

use crate::error::Result;
use crate::matcher::RuleMatcher;
use crate::models::{EvaluationOptions, EvaluationResult, Rule, TransactionContext};
use crate::policy::ResolutionPolicy;
use crate::store::{RuleSet, RuleSource};
use point_shared::observability::metrics as point_metrics;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// 积分评估引擎
#[derive(Debug, Clone, Copy, Default)]
pub struct PointEngine {
    options: EvaluationOptions,
}

impl PointEngine {
    pub fn new(options: EvaluationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> EvaluationOptions {
        self.options
    }

    /// 使用引擎默认选项评估
    pub fn evaluate(&self, context: &TransactionContext, rules: &RuleSet) -> Result<EvaluationResult> {
        self.evaluate_with_options(context, rules, self.options)
    }

    /// 在一个规则快照上评估交易
    pub fn evaluate_with_options(
        &self,
        context: &TransactionContext,
        rules: &RuleSet,
        options: EvaluationOptions,
    ) -> Result<EvaluationResult> {
        self.run(context, rules.rules(), options)
    }

    /// 先从外部存储取出门店的 ACTIVE 规则，再评估
    pub fn evaluate_from_source<S>(&self, context: &TransactionContext, source: &S) -> Result<EvaluationResult>
    where
        S: RuleSource + ?Sized,
    {
        let rules = source.active_rules_by_branch(&context.branch_id);
        self.run(context, &rules, self.options)
    }

    #[instrument(
        name = "evaluate",
        skip_all,
        fields(
            branch_id = %context.branch_id,
            amount = %context.amount,
            policy = %ResolutionPolicy::from(options),
        )
    )]
    fn run(
        &self,
        context: &TransactionContext,
        rules: &[Arc<Rule>],
        options: EvaluationOptions,
    ) -> Result<EvaluationResult> {
        let start = Instant::now();
        let policy = ResolutionPolicy::from(options);

        let candidates = RuleMatcher::find_candidates(rules, context);
        let outcome = policy.resolve(candidates, context.amount);

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                point_metrics::record_evaluation_error(e.code());
                warn!(error = %e, code = e.code(), "积分评估失败");
                return Err(e);
            }
        };

        point_metrics::record_evaluation(
            &policy.to_string(),
            result.candidates,
            result.points,
            start.elapsed().as_secs_f64(),
        );

        debug!(
            points = result.points,
            candidates = result.candidates,
            applied = ?result.applied_rules,
            "积分评估完成"
        );

        Ok(result)
    }
}

//! 规则裁决策略
//!
//! 多条规则同时命中时决定采用哪些奖励。默认取积分最高的一条，积分相同时
//! 按候选顺序取第一条；开启叠加后累加全部候选的积分。没有候选时返回 0 积分。

use crate::calculator::RewardCalculator;
use crate::error::{Result, RuleError};
use crate::models::{EvaluationOptions, EvaluationResult, Rule, RuleReward};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// 裁决策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    BestOf,
    Stacking,
}

impl From<EvaluationOptions> for ResolutionPolicy {
    fn from(options: EvaluationOptions) -> Self {
        if options.stacking {
            Self::Stacking
        } else {
            Self::BestOf
        }
    }
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BestOf => write!(f, "best_of"),
            Self::Stacking => write!(f, "stacking"),
        }
    }
}

impl ResolutionPolicy {
    /// 计算每个候选的积分并按策略汇总
    ///
    /// 任意候选计算溢出都会使整次评估失败。
    pub fn resolve<'a, I>(&self, candidates: I, amount: Decimal) -> Result<EvaluationResult>
    where
        I: IntoIterator<Item = &'a Arc<Rule>>,
    {
        let mut rewards = Vec::new();
        for rule in candidates {
            let points = RewardCalculator::compute(rule, amount)?;
            rewards.push(RuleReward {
                rule_id: rule.id().to_string(),
                rule_name: rule.name().to_string(),
                rule_type: rule.rule_type(),
                points,
            });
        }

        let candidates = rewards.len();
        if rewards.is_empty() {
            return Ok(EvaluationResult::default());
        }

        let selected = match self {
            Self::BestOf => Self::best_of(rewards).into_iter().collect(),
            Self::Stacking => rewards,
        };

        let mut total: i64 = 0;
        for reward in &selected {
            total = total
                .checked_add(reward.points)
                .ok_or_else(|| RuleError::overflow(&reward.rule_id, "叠加积分"))?;
        }

        Ok(EvaluationResult {
            points: total,
            applied_rules: selected.iter().map(|r| r.rule_id.clone()).collect(),
            rewards: selected,
            candidates,
        })
    }

    /// 严格大于才替换，保证平局时先出现的规则胜出
    fn best_of(rewards: Vec<RuleReward>) -> Option<RuleReward> {
        rewards
            .into_iter()
            .reduce(|best, reward| if reward.points > best.points { reward } else { best })
    }
}

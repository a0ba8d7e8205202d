//! 规则编译器
//!
//! 将持久化的规则文档转换为强类型的 `Rule`。rule_type 在这里从自由字符串
//! 收敛为封闭枚举，缺失或非法的奖励参数在加载阶段即被拒绝。

use crate::error::{Result, RuleError};
use crate::models::{Conditions, Reward, Rule, RuleDocument, RuleStatus, RuleType};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

/// 批量编译中被跳过的文档
#[derive(Debug, Clone, Serialize)]
pub struct LoadFailure {
    /// 文档在输入中的位置
    pub index: usize,
    pub rule_id: Option<String>,
    pub name: String,
    pub code: &'static str,
    pub error: String,
}

/// 批量编译结果
#[derive(Debug, Default)]
pub struct LoadReport {
    pub rules: Vec<Rule>,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn loaded(&self) -> usize {
        self.rules.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    /// 从 JSON 字符串编译单条规则
    pub fn compile_from_json(json: &str) -> Result<Rule> {
        let doc: RuleDocument =
            serde_json::from_str(json).map_err(|e| RuleError::Parse(e.to_string()))?;
        Self::compile(doc)
    }

    /// 编译规则文档
    pub fn compile(doc: RuleDocument) -> Result<Rule> {
        let rule_id = match doc.id {
            Some(id) if !id.is_empty() => id,
            _ => Uuid::new_v4().to_string(),
        };

        let rule_type: RuleType = doc
            .rule_type
            .parse()
            .map_err(|reason| RuleError::invalid_rule(&rule_id, reason))?;

        let status: RuleStatus = doc
            .status
            .parse()
            .map_err(|reason| RuleError::invalid_rule(&rule_id, reason))?;

        let reward = Self::build_reward(&rule_id, rule_type, doc.reward.value, doc.reward.ratio_unit)?;

        let conditions = Conditions::new(
            doc.conditions.min_amount,
            doc.conditions.branch_id,
            doc.conditions.category_ids,
        );

        let rule = Rule::new(rule_id, doc.name, conditions, reward, status)?;
        debug!(rule_id = %rule.id(), rule_type = %rule.rule_type(), "规则已编译");
        Ok(rule)
    }

    /// 批量编译，无效文档被跳过并记录在报告中
    pub fn compile_batch(docs: Vec<RuleDocument>) -> LoadReport {
        let mut report = LoadReport::default();

        for (index, doc) in docs.into_iter().enumerate() {
            let rule_id = doc.id.clone();
            let name = doc.name.clone();

            match Self::compile(doc) {
                Ok(rule) => report.rules.push(rule),
                Err(e) => {
                    warn!(index, rule_id = ?rule_id, name = %name, error = %e, "跳过无效规则");
                    report.failures.push(LoadFailure {
                        index,
                        rule_id,
                        name,
                        code: e.code(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }

    fn build_reward(
        rule_id: &str,
        rule_type: RuleType,
        value: Option<i64>,
        ratio_unit: Option<rust_decimal::Decimal>,
    ) -> Result<Reward> {
        let value = value.ok_or_else(|| {
            RuleError::invalid_rule(rule_id, format!("{} 规则缺少 reward.value", rule_type))
        })?;

        let reward = match rule_type {
            RuleType::Ratio => {
                let ratio_unit = ratio_unit.ok_or_else(|| {
                    RuleError::invalid_rule(rule_id, "RATIO 规则缺少 reward.ratio_unit")
                })?;
                Reward::Ratio {
                    points_per_unit: value,
                    ratio_unit,
                }
            }
            RuleType::FixedPoint => Reward::FixedPoint { points: value },
            RuleType::Percentage => {
                let percent = u32::try_from(value).map_err(|_| {
                    RuleError::invalid_rule(
                        rule_id,
                        format!("percent 必须在 (0, 100] 范围内: {}", value),
                    )
                })?;
                Reward::Percentage { percent }
            }
        };

        Ok(reward)
    }
}

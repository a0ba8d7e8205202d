//! 积分规则领域模型
//!
//! `Rule` 是引擎内部使用的强类型规则，构造时完成全部校验；
//! `RuleDocument` 与规则集合中持久化的文档结构一一对应，由编译器转换为 `Rule`。

use crate::error::{Result, RuleError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// 规则类型，决定积分计算策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    Ratio,
    FixedPoint,
    Percentage,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ratio => "RATIO",
            Self::FixedPoint => "FIXED_POINT",
            Self::Percentage => "PERCENTAGE",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "RATIO" => Ok(Self::Ratio),
            "FIXED_POINT" => Ok(Self::FixedPoint),
            "PERCENTAGE" => Ok(Self::Percentage),
            other => Err(format!("未知的规则类型: '{}'", other)),
        }
    }
}

/// 规则状态，只有 ACTIVE 规则参与匹配
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleStatus {
    Active,
    Inactive,
}

impl RuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            other => Err(format!("未知的规则状态: '{}'", other)),
        }
    }
}

/// 奖励策略，每种规则类型携带各自的参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reward {
    /// 每消费 `ratio_unit` 获得 `points_per_unit` 积分
    Ratio {
        points_per_unit: i64,
        ratio_unit: Decimal,
    },
    /// 固定积分，与金额无关
    FixedPoint { points: i64 },
    /// 按金额百分比计算积分
    Percentage { percent: u32 },
}

impl Reward {
    pub fn rule_type(&self) -> RuleType {
        match self {
            Self::Ratio { .. } => RuleType::Ratio,
            Self::FixedPoint { .. } => RuleType::FixedPoint,
            Self::Percentage { .. } => RuleType::Percentage,
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Self::Ratio {
                points_per_unit,
                ratio_unit,
            } => {
                if *points_per_unit < 0 {
                    return Err(format!("points_per_unit 不能为负数: {}", points_per_unit));
                }
                if *ratio_unit <= Decimal::ZERO {
                    return Err(format!("ratio_unit 必须大于 0: {}", ratio_unit));
                }
            }
            Self::FixedPoint { points } => {
                if *points < 0 {
                    return Err(format!("points 不能为负数: {}", points));
                }
            }
            Self::Percentage { percent } => {
                if *percent == 0 || *percent > 100 {
                    return Err(format!("percent 必须在 (0, 100] 范围内: {}", percent));
                }
            }
        }
        Ok(())
    }
}

/// 匹配条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conditions {
    pub min_amount: Decimal,
    pub branch_id: String,
    /// 任意一个分类命中即满足
    pub category_ids: BTreeSet<String>,
}

impl Conditions {
    pub fn new<I, S>(min_amount: Decimal, branch_id: impl Into<String>, category_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            min_amount,
            branch_id: branch_id.into(),
            category_ids: category_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// 积分规则
///
/// 只能通过 [`Rule::new`] 构造，构造成功即满足全部不变量。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    id: String,
    name: String,
    conditions: Conditions,
    reward: Reward,
    status: RuleStatus,
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        conditions: Conditions,
        reward: Reward,
        status: RuleStatus,
    ) -> Result<Self> {
        let rule = Self {
            id: id.into(),
            name: name.into(),
            conditions,
            reward,
            status,
        };
        rule.validate()?;
        Ok(rule)
    }

    fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(RuleError::invalid_rule("", "规则 ID 不能为空"));
        }
        if self.name.is_empty() {
            return Err(RuleError::invalid_rule(&self.id, "规则名称不能为空"));
        }
        if self.conditions.min_amount < Decimal::ZERO {
            return Err(RuleError::invalid_rule(
                &self.id,
                format!("min_amount 不能为负数: {}", self.conditions.min_amount),
            ));
        }
        if self.conditions.branch_id.is_empty() {
            return Err(RuleError::invalid_rule(&self.id, "branch_id 不能为空"));
        }
        if self.conditions.category_ids.is_empty() {
            return Err(RuleError::invalid_rule(&self.id, "category_ids 不能为空"));
        }
        self.reward
            .validate()
            .map_err(|reason| RuleError::invalid_rule(&self.id, reason))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule_type(&self) -> RuleType {
        self.reward.rule_type()
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    pub fn reward(&self) -> &Reward {
        &self.reward
    }

    pub fn status(&self) -> RuleStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == RuleStatus::Active
    }
}

/// 交易上下文 - 提供给规则引擎的输入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionContext {
    pub amount: Decimal,
    pub branch_id: String,
    pub category_ids: BTreeSet<String>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl TransactionContext {
    pub fn new<I, S>(amount: Decimal, branch_id: impl Into<String>, category_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            amount,
            branch_id: branch_id.into(),
            category_ids: category_ids.into_iter().map(Into::into).collect(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// 从 JSON 对象创建
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// 评估选项
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationOptions {
    /// 为 true 时累加所有候选规则的积分，否则取最高者
    #[serde(default)]
    pub stacking: bool,
}

impl EvaluationOptions {
    pub fn stacking() -> Self {
        Self { stacking: true }
    }
}

/// 单条规则贡献的积分
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleReward {
    pub rule_id: String,
    pub rule_name: String,
    pub rule_type: RuleType,
    pub points: i64,
}

/// 评估结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    pub points: i64,
    pub applied_rules: Vec<String>,
    pub rewards: Vec<RuleReward>,
    /// 满足条件的候选规则数量（含未被采用的）
    pub candidates: usize,
}

impl EvaluationResult {
    pub fn is_empty(&self) -> bool {
        self.applied_rules.is_empty()
    }
}

// ==================== 持久化文档结构 ====================

/// 规则文档，字段与 rules 集合中的存储结构一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub rule_type: String,
    pub conditions: ConditionsDocument,
    pub reward: RewardDocument,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionsDocument {
    pub min_amount: Decimal,
    pub branch_id: String,
    #[serde(default)]
    pub category_ids: Vec<String>,
}

/// 奖励参数：`value` 的含义由 rule_type 决定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardDocument {
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio_unit: Option<Decimal>,
}

impl From<&Rule> for RuleDocument {
    fn from(rule: &Rule) -> Self {
        let reward = match rule.reward() {
            Reward::Ratio {
                points_per_unit,
                ratio_unit,
            } => RewardDocument {
                value: Some(*points_per_unit),
                ratio_unit: Some(*ratio_unit),
            },
            Reward::FixedPoint { points } => RewardDocument {
                value: Some(*points),
                ratio_unit: None,
            },
            Reward::Percentage { percent } => RewardDocument {
                value: Some(i64::from(*percent)),
                ratio_unit: None,
            },
        };

        Self {
            id: Some(rule.id().to_string()),
            name: rule.name().to_string(),
            rule_type: rule.rule_type().to_string(),
            conditions: ConditionsDocument {
                min_amount: rule.conditions().min_amount,
                branch_id: rule.conditions().branch_id.clone(),
                category_ids: rule.conditions().category_ids.iter().cloned().collect(),
            },
            reward,
            status: rule.status().to_string(),
        }
    }
}

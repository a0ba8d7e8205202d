//! 积分计算器
//!
//! 按规则的奖励策略计算积分。全程使用十进制定点运算，不经过任何浮点转换；
//! 只有结果超出 i64 范围时才返回错误。

use crate::error::{Result, RuleError};
use crate::models::{Reward, Rule};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// 积分计算器
pub struct RewardCalculator;

impl RewardCalculator {
    /// 计算单条规则对给定金额产生的积分
    ///
    /// - RATIO: `floor(amount / ratio_unit) * points_per_unit`
    /// - FIXED_POINT: `points`
    /// - PERCENTAGE: `floor(amount * percent / 100)`
    ///
    /// 金额门槛由匹配器负责，这里不再检查 min_amount。
    pub fn compute(rule: &Rule, amount: Decimal) -> Result<i64> {
        match rule.reward() {
            Reward::Ratio {
                points_per_unit,
                ratio_unit,
            } => Self::ratio(rule.id(), amount, *ratio_unit, *points_per_unit),
            Reward::FixedPoint { points } => Ok(*points),
            Reward::Percentage { percent } => Self::percentage(rule.id(), amount, *percent),
        }
    }

    fn ratio(rule_id: &str, amount: Decimal, ratio_unit: Decimal, points_per_unit: i64) -> Result<i64> {
        let units = amount
            .checked_div(ratio_unit)
            .ok_or_else(|| RuleError::overflow(rule_id, "amount / ratio_unit"))?
            .floor();

        let points = units
            .checked_mul(Decimal::from(points_per_unit))
            .ok_or_else(|| RuleError::overflow(rule_id, "units * points_per_unit"))?;

        Self::to_points(rule_id, points)
    }

    fn percentage(rule_id: &str, amount: Decimal, percent: u32) -> Result<i64> {
        let points = amount
            .checked_mul(Decimal::from(percent))
            .ok_or_else(|| RuleError::overflow(rule_id, "amount * percent"))?
            .checked_div(Decimal::ONE_HUNDRED)
            .ok_or_else(|| RuleError::overflow(rule_id, "amount * percent / 100"))?
            .trunc();

        Self::to_points(rule_id, points)
    }

    fn to_points(rule_id: &str, value: Decimal) -> Result<i64> {
        value
            .to_i64()
            .ok_or_else(|| RuleError::overflow(rule_id, format!("{} 超出积分取值范围", value)))
    }
}

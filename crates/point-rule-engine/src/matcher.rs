//! 规则匹配器
//!
//! 从规则集中筛选满足交易上下文的候选规则。结果是惰性、可重复遍历的
//! 迭代器，顺序与规则集的插入顺序一致，下游的平局裁决依赖这一顺序。

use crate::models::{Rule, TransactionContext};
use std::iter::FusedIterator;
use std::sync::Arc;

/// 规则匹配器
pub struct RuleMatcher;

impl RuleMatcher {
    /// 筛选候选规则
    pub fn find_candidates<'a>(
        rules: &'a [Arc<Rule>],
        context: &'a TransactionContext,
    ) -> Candidates<'a> {
        Candidates {
            rules: rules.iter(),
            context,
        }
    }

    /// 判断单条规则是否满足上下文
    ///
    /// 依次检查：状态、门店、最低金额（精确十进制比较）、分类交集。
    pub fn matches(rule: &Rule, context: &TransactionContext) -> bool {
        if !rule.is_active() {
            return false;
        }

        let conditions = rule.conditions();

        if conditions.branch_id != context.branch_id {
            return false;
        }

        if context.amount < conditions.min_amount {
            return false;
        }

        conditions
            .category_ids
            .iter()
            .any(|category| context.category_ids.contains(category))
    }
}

/// 候选规则迭代器
///
/// 未消费前克隆一份，即可对同一批候选独立遍历多次。
#[derive(Clone)]
pub struct Candidates<'a> {
    rules: std::slice::Iter<'a, Arc<Rule>>,
    context: &'a TransactionContext,
}

impl<'a> Iterator for Candidates<'a> {
    type Item = &'a Arc<Rule>;

    fn next(&mut self) -> Option<Self::Item> {
        let context = self.context;
        self.rules
            .by_ref()
            .find(|rule| RuleMatcher::matches(rule, context))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.rules.size_hint().1)
    }
}

impl FusedIterator for Candidates<'_> {}

//! 规则存储管理
//!
//! `RuleSet` 是不可变的规则快照，保持插入顺序并按门店建立 ACTIVE 规则索引
//! （对应规则集合上 status + branch_id + category_ids 的复合索引）。
//! `RuleStore` 通过 `ArcSwap` 持有当前快照，刷新时整体替换，
//! 评估过程始终只读取同一个快照。

use crate::compiler::{LoadFailure, RuleCompiler};
use crate::error::{Result, RuleError};
use crate::models::{Rule, RuleDocument};
use arc_swap::ArcSwap;
use point_shared::observability::metrics as point_metrics;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 外部规则存储的读取契约
#[cfg_attr(test, mockall::automock)]
pub trait RuleSource: Send + Sync {
    /// 获取某门店下全部 ACTIVE 规则，按插入顺序返回
    fn active_rules_by_branch(&self, branch_id: &str) -> Vec<Arc<Rule>>;
}

/// 不可变规则快照
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Arc<Rule>>,
    by_id: HashMap<String, usize>,
    /// branch_id -> ACTIVE 规则在 `rules` 中的位置（升序）
    active_by_branch: HashMap<String, Vec<usize>>,
}

impl RuleSet {
    /// 构建规则快照，规则 ID 重复时拒绝
    pub fn new(rules: Vec<Rule>) -> Result<Self> {
        let mut set = Self::default();

        for rule in rules {
            let position = set.rules.len();
            if set.by_id.insert(rule.id().to_string(), position).is_some() {
                return Err(RuleError::invalid_rule(rule.id(), "规则 ID 重复"));
            }

            if rule.is_active() {
                set.active_by_branch
                    .entry(rule.conditions().branch_id.clone())
                    .or_default()
                    .push(position);
            }

            set.rules.push(Arc::new(rule));
        }

        Ok(set)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// 全部规则（含 INACTIVE），按插入顺序
    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, rule_id: &str) -> Option<&Arc<Rule>> {
        self.by_id.get(rule_id).map(|&i| &self.rules[i])
    }

    pub fn contains(&self, rule_id: &str) -> bool {
        self.by_id.contains_key(rule_id)
    }

    pub fn active_rules_by_branch(&self, branch_id: &str) -> Vec<Arc<Rule>> {
        self.active_by_branch
            .get(branch_id)
            .map(|positions| positions.iter().map(|&i| self.rules[i].clone()).collect())
            .unwrap_or_default()
    }

    /// 按门店与分类批量查询 ACTIVE 规则
    ///
    /// 规则的门店必须是 `branch_categories` 的键；若该门店给出了分类，
    /// 规则分类与之至少有一个交集。空映射视为无效参数。
    pub fn find_active_rules(
        &self,
        branch_categories: &BTreeMap<String, BTreeSet<String>>,
    ) -> Result<Vec<Arc<Rule>>> {
        if branch_categories.is_empty() {
            return Err(RuleError::InvalidArgument(
                "branch_categories 不能为空".to_string(),
            ));
        }

        let mut positions: Vec<usize> = Vec::new();
        for (branch_id, categories) in branch_categories {
            let Some(indexed) = self.active_by_branch.get(branch_id) else {
                continue;
            };

            positions.extend(indexed.iter().copied().filter(|&i| {
                categories.is_empty()
                    || self.rules[i]
                        .conditions()
                        .category_ids
                        .iter()
                        .any(|c| categories.contains(c))
            }));
        }

        positions.sort_unstable();
        Ok(positions.into_iter().map(|i| self.rules[i].clone()).collect())
    }

    /// 获取规则统计信息
    pub fn stats(&self) -> RuleSetStats {
        RuleSetStats {
            rules_count: self.rules.len(),
            active_count: self.active_by_branch.values().map(Vec::len).sum(),
            branch_count: self.active_by_branch.len(),
        }
    }
}

impl RuleSource for RuleSet {
    fn active_rules_by_branch(&self, branch_id: &str) -> Vec<Arc<Rule>> {
        RuleSet::active_rules_by_branch(self, branch_id)
    }
}

/// 规则快照统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSetStats {
    /// 规则总数
    pub rules_count: usize,
    /// ACTIVE 规则数
    pub active_count: usize,
    /// 有 ACTIVE 规则的门店数
    pub branch_count: usize,
}

/// 一次加载的结果
#[derive(Debug, Default)]
pub struct LoadSummary {
    pub loaded: usize,
    pub failures: Vec<LoadFailure>,
}

/// 规则存储
#[derive(Clone)]
pub struct RuleStore {
    current: Arc<ArcSwap<RuleSet>>,
}

impl RuleStore {
    /// 创建空的规则存储
    pub fn new() -> Self {
        Self::with_rules(RuleSet::empty())
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(rules)),
        }
    }

    /// 当前快照，调用方持有期间不受后续替换影响
    pub fn snapshot(&self) -> Arc<RuleSet> {
        self.current.load_full()
    }

    /// 原子替换快照，返回旧快照
    pub fn replace(&self, rules: RuleSet) -> Arc<RuleSet> {
        let stats = rules.stats();
        let previous = self.current.swap(Arc::new(rules));

        point_metrics::record_rules_loaded(stats.rules_count);
        info!(
            rules = stats.rules_count,
            active = stats.active_count,
            branches = stats.branch_count,
            "规则快照已替换"
        );

        previous
    }

    /// 用已编译的规则替换快照
    pub fn load(&self, rules: Vec<Rule>) -> Result<usize> {
        let set = RuleSet::new(rules)?;
        let loaded = set.len();
        self.replace(set);
        Ok(loaded)
    }

    /// 编译规则文档并替换快照
    ///
    /// 无效文档被跳过并记录；ID 重复时整批失败，当前快照保持不变。
    #[instrument(skip(self, docs), fields(documents = docs.len()))]
    pub fn load_documents(&self, docs: Vec<RuleDocument>) -> Result<LoadSummary> {
        let report = RuleCompiler::compile_batch(docs);

        if !report.is_clean() {
            point_metrics::record_load_failures(report.failed());
            warn!("批量加载部分失败: {} 条规则被跳过", report.failed());
        }

        let failures = report.failures;
        let loaded = self.load(report.rules)?;

        info!("批量加载完成: {} 成功, {} 失败", loaded, failures.len());
        Ok(LoadSummary { loaded, failures })
    }

    /// 从 JSON 数组加载规则文档
    #[instrument(skip(self, json))]
    pub fn load_from_json(&self, json: &str) -> Result<LoadSummary> {
        let docs: Vec<RuleDocument> =
            serde_json::from_str(json).map_err(|e| RuleError::Parse(e.to_string()))?;
        self.load_documents(docs)
    }

    /// 从文件加载规则文档
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load_from_path(&self, path: impl AsRef<Path>) -> Result<LoadSummary> {
        let json = std::fs::read_to_string(path.as_ref())?;
        self.load_from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    pub fn get(&self, rule_id: &str) -> Option<Arc<Rule>> {
        self.current.load().get(rule_id).cloned()
    }

    /// 获取规则，不存在时返回 `RuleNotFound`
    pub fn require(&self, rule_id: &str) -> Result<Arc<Rule>> {
        self.get(rule_id)
            .ok_or_else(|| RuleError::RuleNotFound(rule_id.to_string()))
    }

    /// 清空所有规则
    pub fn clear(&self) {
        self.replace(RuleSet::empty());
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSource for RuleStore {
    fn active_rules_by_branch(&self, branch_id: &str) -> Vec<Arc<Rule>> {
        self.current.load().active_rules_by_branch(branch_id)
    }
}

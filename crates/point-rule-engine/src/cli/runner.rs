//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑，结果以可序列化结构返回，由入口负责输出。

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::compiler::{LoadFailure, RuleCompiler};
use crate::engine::PointEngine;
use crate::models::{EvaluationOptions, EvaluationResult, RuleDocument, TransactionContext};
use crate::money::parse_amount;
use crate::store::{RuleSet, RuleStore};

/// 规则文件校验结果
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub path: String,
    pub loaded: usize,
    pub skipped: usize,
    pub failures: Vec<LoadFailure>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 命令执行器
///
/// 持有规则存储与引擎，作为 CLI 与引擎之间的桥梁。
pub struct CommandRunner {
    store: RuleStore,
    engine: PointEngine,
    currency_scale: u32,
}

impl CommandRunner {
    /// 创建命令执行器
    pub fn new(engine: PointEngine, currency_scale: u32) -> Self {
        Self {
            store: RuleStore::new(),
            engine,
            currency_scale,
        }
    }

    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    /// 从文件加载规则到存储
    pub fn load_rules(&self, path: &Path) -> Result<usize> {
        let summary = self
            .store
            .load_from_path(path)
            .with_context(|| format!("加载规则文件失败: {}", path.display()))?;

        if !summary.failures.is_empty() {
            warn!(skipped = summary.failures.len(), "部分规则文档无效，已跳过");
        }
        info!(loaded = summary.loaded, path = %path.display(), "规则已加载");

        Ok(summary.loaded)
    }

    /// 执行 evaluate 命令
    pub fn run_evaluate(
        &self,
        amount: &str,
        branch: &str,
        categories: &[String],
        timestamp: Option<DateTime<Utc>>,
        stacking: bool,
    ) -> Result<EvaluationResult> {
        let amount = parse_amount(amount, self.currency_scale)?;

        let mut context = TransactionContext::new(amount, branch, categories.iter().cloned());
        if let Some(timestamp) = timestamp {
            context = context.with_timestamp(timestamp);
        }

        let options = EvaluationOptions {
            stacking: stacking || self.engine.options().stacking,
        };

        let snapshot = self.store.snapshot();
        let result = self
            .engine
            .evaluate_with_options(&context, &snapshot, options)?;

        Ok(result)
    }

    /// 执行 validate 命令
    ///
    /// 不修改存储，只编译并汇总无效文档；规则 ID 重复视为整个文件无效。
    pub fn run_validate(&self, path: &Path) -> Result<ValidationReport> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("读取规则文件失败: {}", path.display()))?;
        let docs: Vec<RuleDocument> =
            serde_json::from_str(&json).with_context(|| format!("规则文件格式错误: {}", path.display()))?;

        let report = RuleCompiler::compile_batch(docs);
        let skipped = report.failed();
        let failures = report.failures;
        let set = RuleSet::new(report.rules)?;

        Ok(ValidationReport {
            path: path.display().to_string(),
            loaded: set.len(),
            skipped,
            failures,
        })
    }

    /// 执行 list 命令
    pub fn run_list(&self, branch: Option<&str>) -> Vec<RuleDocument> {
        let snapshot = self.store.snapshot();

        match branch {
            Some(branch) => snapshot
                .active_rules_by_branch(branch)
                .iter()
                .map(|rule| RuleDocument::from(rule.as_ref()))
                .collect(),
            None => snapshot
                .rules()
                .iter()
                .filter(|rule| rule.is_active())
                .map(|rule| RuleDocument::from(rule.as_ref()))
                .collect(),
        }
    }

    /// 执行 show 命令
    pub fn run_show(&self, rule_id: &str) -> Result<RuleDocument> {
        let rule = self.store.require(rule_id)?;
        Ok(RuleDocument::from(rule.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const RULES: &str = r#"[
        {
            "id": "rule-001",
            "name": "ELECTRONICS - 1 point per 100 THB",
            "rule_type": "RATIO",
            "conditions": { "min_amount": "100.00", "branch_id": "BR3444", "category_ids": ["CT1001"] },
            "reward": { "value": 1, "ratio_unit": 100 },
            "status": "ACTIVE"
        },
        {
            "id": "rule-002",
            "name": "ELECTRONICS bonus",
            "rule_type": "FIXED_POINT",
            "conditions": { "min_amount": "100.00", "branch_id": "BR3444", "category_ids": ["CT1001"] },
            "reward": { "value": 5 },
            "status": "ACTIVE"
        },
        {
            "id": "rule-003",
            "name": "FOOD - 2% points",
            "rule_type": "PERCENTAGE",
            "conditions": { "min_amount": "0.01", "branch_id": "BR3456", "category_ids": ["CT1003"] },
            "reward": { "value": 2 },
            "status": "INACTIVE"
        }
    ]"#;

    fn rules_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn runner_with_rules(stacking: bool) -> (CommandRunner, tempfile::NamedTempFile) {
        let file = rules_file(RULES);
        let runner = CommandRunner::new(PointEngine::new(EvaluationOptions { stacking }), 2);
        runner.load_rules(file.path()).unwrap();
        (runner, file)
    }

    #[test]
    fn test_run_evaluate_best_of() {
        let (runner, _file) = runner_with_rules(false);

        let result = runner
            .run_evaluate("250.00", "BR3444", &["CT1001".to_string()], None, false)
            .unwrap();

        assert_eq!(result.points, 5);
        assert_eq!(result.applied_rules, vec!["rule-002"]);
    }

    #[test]
    fn test_run_evaluate_stacking_flag() {
        let (runner, _file) = runner_with_rules(false);

        let result = runner
            .run_evaluate("250.00", "BR3444", &["CT1001".to_string()], None, true)
            .unwrap();

        assert_eq!(result.points, 7);
    }

    #[test]
    fn test_run_evaluate_configured_stacking() {
        let (runner, _file) = runner_with_rules(true);

        let result = runner
            .run_evaluate("250.00", "BR3444", &["CT1001".to_string()], None, false)
            .unwrap();

        assert_eq!(result.points, 7);
    }

    #[test]
    fn test_run_evaluate_rejects_bad_amount() {
        let (runner, _file) = runner_with_rules(false);

        assert!(runner
            .run_evaluate("250.001", "BR3444", &["CT1001".to_string()], None, false)
            .is_err());
        assert!(runner
            .run_evaluate("abc", "BR3444", &["CT1001".to_string()], None, false)
            .is_err());
    }

    #[test]
    fn test_run_validate_reports_invalid_documents() {
        let file = rules_file(
            r#"[
                { "id": "ok", "name": "ok", "rule_type": "FIXED_POINT",
                  "conditions": { "min_amount": "1.00", "branch_id": "BR1", "category_ids": ["CT1"] },
                  "reward": { "value": 3 }, "status": "ACTIVE" },
                { "id": "bad", "name": "bad", "rule_type": "BONUS",
                  "conditions": { "min_amount": "1.00", "branch_id": "BR1", "category_ids": ["CT1"] },
                  "reward": { "value": 3 }, "status": "ACTIVE" }
            ]"#,
        );
        let runner = CommandRunner::new(PointEngine::default(), 2);

        let report = runner.run_validate(file.path()).unwrap();

        assert!(!report.is_valid());
        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failures[0].rule_id.as_deref(), Some("bad"));
        // 校验不会修改存储
        assert!(runner.store().is_empty());
    }

    #[test]
    fn test_run_validate_clean_file() {
        let file = rules_file(RULES);
        let runner = CommandRunner::new(PointEngine::default(), 2);

        let report = runner.run_validate(file.path()).unwrap();

        assert!(report.is_valid());
        assert_eq!(report.loaded, 3);
    }

    #[test]
    fn test_run_list() {
        let (runner, _file) = runner_with_rules(false);

        let all: Vec<_> = runner.run_list(None).into_iter().filter_map(|d| d.id).collect();
        assert_eq!(all, vec!["rule-001", "rule-002"]);

        assert!(runner.run_list(Some("BR3456")).is_empty());
        assert_eq!(runner.run_list(Some("BR3444")).len(), 2);
    }

    #[test]
    fn test_run_show() {
        let (runner, _file) = runner_with_rules(false);

        let doc = runner.run_show("rule-003").unwrap();
        assert_eq!(doc.status, "INACTIVE");
        assert_eq!(doc.rule_type, "PERCENTAGE");

        assert!(runner.run_show("rule-999").is_err());
    }

    #[test]
    fn test_load_rules_missing_file() {
        let runner = CommandRunner::new(PointEngine::default(), 2);
        assert!(runner.load_rules(Path::new("/nonexistent/rules.json")).is_err());
    }
}

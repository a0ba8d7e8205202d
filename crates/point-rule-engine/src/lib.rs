//! 积分规则引擎
//!
//! 根据门店、商品分类与消费金额计算会员积分，支持：
//! - 规则文档解析与加载期校验
//! - 比例 / 固定 / 百分比三种奖励策略，全程十进制精确计算
//! - 取最高或叠加两种裁决策略
//! - 原子替换的规则快照

pub mod calculator;
pub mod cli;
pub mod compiler;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod models;
pub mod money;
pub mod policy;
pub mod store;

pub use calculator::RewardCalculator;
pub use compiler::{LoadFailure, LoadReport, RuleCompiler};
pub use engine::PointEngine;
pub use error::{Result, RuleError};
pub use matcher::{Candidates, RuleMatcher};
pub use models::{
    Conditions, EvaluationOptions, EvaluationResult, Reward, Rule, RuleDocument, RuleReward,
    RuleStatus, RuleType, TransactionContext,
};
pub use money::{parse_amount, DEFAULT_CURRENCY_SCALE};
pub use policy::ResolutionPolicy;
pub use store::{LoadSummary, RuleSet, RuleSetStats, RuleSource, RuleStore};

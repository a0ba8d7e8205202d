//! CLI 模块
//!
//! 提供命令行接口，支持以下功能：
//!
//! - `evaluate` - 对一笔交易计算积分
//! - `validate` - 校验规则文件
//! - `list` - 列出 ACTIVE 规则
//! - `show` - 按 ID 查看规则
//!
//! # 使用示例
//!
//! ```bash
//! # 计算积分
//! point-engine evaluate --amount 250.00 --branch BR3444 --category CT1001
//!
//! # 叠加所有命中规则
//! point-engine evaluate --amount 250.00 --branch BR3444 -c CT1001 -c CT1002 --stacking
//!
//! # 校验规则文件
//! point-engine --rules data/seed_rules.json validate
//!
//! # 列出某门店的规则
//! point-engine list --branch BR3456
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands};
pub use runner::{CommandRunner, ValidationReport};

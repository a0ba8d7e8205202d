//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// 积分规则引擎命令行工具
#[derive(Parser, Debug)]
#[command(name = "point-engine")]
#[command(version, about = "会员积分规则引擎")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 配置目录，未指定时读取 CONFIG_DIR 或 ./config
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// 规则文件路径，覆盖配置中的 rules.path
    #[arg(short, long, global = true)]
    pub rules: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 对一笔交易计算积分
    ///
    /// 输出 JSON 格式的评估结果，包含总积分与被采用的规则。
    Evaluate {
        /// 交易金额（如 250.00），小数位数不得超过货币精度
        #[arg(short, long)]
        amount: String,

        /// 门店 ID
        #[arg(short, long)]
        branch: String,

        /// 商品分类 ID，可重复指定
        #[arg(short, long = "category", required = true)]
        categories: Vec<String>,

        /// 交易时间（RFC 3339），默认当前时间
        #[arg(short, long)]
        timestamp: Option<DateTime<Utc>>,

        /// 累加所有命中规则的积分
        #[arg(long)]
        stacking: bool,
    },

    /// 校验规则文件
    ///
    /// 存在无效文档时以非零状态退出。
    Validate,

    /// 列出 ACTIVE 规则
    List {
        /// 只列出该门店的规则
        #[arg(short, long)]
        branch: Option<String>,
    },

    /// 按 ID 查看单条规则（含 INACTIVE）
    Show {
        /// 规则 ID
        id: String,
    },
}

// ============================================================================
// 单元测试
// ============================================================================

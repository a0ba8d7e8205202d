//! 积分规则引擎命令行入口
//!
//! 加载配置与规则文件后执行子命令，结果以 JSON 输出到 stdout。

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use point_engine::cli::{Cli, CommandRunner, Commands};
use point_engine::{EvaluationOptions, PointEngine};
use point_shared::config::AppConfig;
use point_shared::observability;
use serde::Serialize;
use tracing::{error, info};

const SERVICE_NAME: &str = "point-engine";

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config_dir {
        Some(dir) => AppConfig::load_from_dir(SERVICE_NAME, dir),
        None => AppConfig::load(SERVICE_NAME),
    }
    .context("加载配置失败")?;

    let _guard = observability::init(&config.observability_config())?;

    let rules_path = cli
        .rules
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.rules.path));

    info!(
        environment = %config.environment,
        rules = %rules_path.display(),
        stacking = config.engine.stacking,
        "Starting point-engine..."
    );

    let engine = PointEngine::new(EvaluationOptions {
        stacking: config.engine.stacking,
    });
    let runner = CommandRunner::new(engine, config.engine.currency_scale);

    match cli.command {
        Commands::Evaluate {
            amount,
            branch,
            categories,
            timestamp,
            stacking,
        } => {
            runner.load_rules(&rules_path)?;
            let result = runner.run_evaluate(&amount, &branch, &categories, timestamp, stacking)?;
            print_json(&result)?;
        }
        Commands::Validate => {
            let report = runner.run_validate(&rules_path)?;
            print_json(&report)?;

            if !report.is_valid() {
                error!(skipped = report.skipped, "规则文件包含无效文档");
                bail!("{} 条规则文档无效", report.skipped);
            }
            info!(loaded = report.loaded, "规则文件校验通过");
        }
        Commands::List { branch } => {
            runner.load_rules(&rules_path)?;
            print_json(&runner.run_list(branch.as_deref()))?;
        }
        Commands::Show { id } => {
            runner.load_rules(&rules_path)?;
            print_json(&runner.run_show(&id)?)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! 统一可观测性模块
//!
//! 提供 logging 与 metrics 的统一初始化。所有入口通过单一函数配置可观测性，
//! 确保一致的日志格式和指标命名。

pub mod metrics;
pub mod tracing;

use ::tracing::info;
use anyhow::Result;

pub use crate::config::ObservabilityConfig;

/// 可观测性资源守卫
///
/// 持有到进程退出，Drop 时输出关闭日志。
pub struct ObservabilityGuard {
    service_name: String,
}

impl ObservabilityGuard {
    /// 创建一个空的 Guard（用于测试或禁用可观测性时）
    pub fn empty() -> Self {
        Self {
            service_name: String::new(),
        }
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        if !self.service_name.is_empty() {
            info!(service = %self.service_name, "Shutting down observability...");
        }
    }
}

/// 统一初始化可观测性
///
/// 初始化顺序：
/// 1. Tracing（日志）
/// 2. Metrics（指标描述，recorder 由宿主进程自行安装）
///
/// # Example
///
/// ```ignore
/// use point_shared::config::AppConfig;
/// use point_shared::observability;
///
/// fn main() -> anyhow::Result<()> {
///     let config = AppConfig::load("point-engine")?;
///     let _guard = observability::init(&config.observability_config())?;
///
///     // 应用逻辑...
///
///     Ok(())
/// }
/// ```
pub fn init(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    tracing::init(config)?;
    metrics::describe_metrics(&config.service_name);

    info!(
        service = %config.service_name,
        log_level = %config.log_level,
        json_logs = config.json_logs,
        "Observability initialized"
    );

    Ok(ObservabilityGuard {
        service_name: config.service_name.clone(),
    })
}

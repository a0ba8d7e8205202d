//! 共享库
//!
//! 包含积分引擎各入口共用的配置加载与可观测性基础设施代码。

pub mod config;
pub mod observability;

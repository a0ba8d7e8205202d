//! 积分规则引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("规则定义无效: rule_id={rule_id}, {reason}")]
    InvalidRule { rule_id: String, reason: String },

    #[error("积分计算溢出: rule_id={rule_id}, {operation}")]
    Arithmetic { rule_id: String, operation: String },

    #[error("规则解析失败: {0}")]
    Parse(String),

    #[error("无效的参数: {0}")]
    InvalidArgument(String),

    #[error("规则未找到: {0}")]
    RuleNotFound(String),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("读取规则文件失败: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RuleError>;

impl RuleError {
    pub(crate) fn invalid_rule(rule_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule_id: rule_id.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(rule_id: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Arithmetic {
            rule_id: rule_id.into(),
            operation: operation.into(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRule { .. } => "INVALID_RULE",
            Self::Arithmetic { .. } => "ARITHMETIC_ERROR",
            Self::Parse(_) => "RULE_PARSE_FAILED",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::Json(_) => "JSON_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }
}

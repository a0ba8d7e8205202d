//! 金额解析
//!
//! 金额一律使用 `Decimal` 精确表示，入口处按货币最小单位校验精度。

use crate::error::{Result, RuleError};
use rust_decimal::Decimal;
use std::str::FromStr;

/// 泰铢最小单位为 satang，两位小数
pub const DEFAULT_CURRENCY_SCALE: u32 = 2;

/// 解析交易金额
///
/// 拒绝负数以及小数位超过 `scale` 的输入，不做任何舍入。
pub fn parse_amount(text: &str, scale: u32) -> Result<Decimal> {
    let trimmed = text.trim();
    let amount = Decimal::from_str(trimmed)
        .map_err(|e| RuleError::InvalidArgument(format!("无效的金额 '{}': {}", trimmed, e)))?;

    check_amount(amount, scale)?;
    Ok(amount)
}

/// 校验金额非负且精度不超过货币最小单位
pub fn check_amount(amount: Decimal, scale: u32) -> Result<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(RuleError::InvalidArgument(format!(
            "金额不能为负数: {}",
            amount
        )));
    }

    if amount.normalize().scale() > scale {
        return Err(RuleError::InvalidArgument(format!(
            "金额 {} 的小数位超过 {} 位",
            amount, scale
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("250.00", 2).unwrap(), dec!(250.00));
        assert_eq!(parse_amount(" 200.01 ", 2).unwrap(), dec!(200.01));
        assert_eq!(parse_amount("600", 2).unwrap(), dec!(600));
    }

    #[test]
    fn test_parse_amount_keeps_exact_value() {
        // 0.1 + 0.2 在二进制浮点下不等于 0.3
        let a = parse_amount("0.10", 2).unwrap();
        let b = parse_amount("0.20", 2).unwrap();
        assert_eq!(a + b, dec!(0.30));
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_precision() {
        assert!(parse_amount("100.0000", 2).is_ok());
    }

    #[test]
    fn test_parse_amount_rejects_excess_precision() {
        let err = parse_amount("100.005", 2).unwrap_err();
        assert_eq!(err.code(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_parse_amount_rejects_negative() {
        assert!(parse_amount("-1.00", 2).is_err());
        assert!(parse_amount("-0.00", 2).is_ok());
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(parse_amount("12,50", 2).is_err());
        assert!(parse_amount("", 2).is_err());
    }
}

use anyhow::{anyhow, bail, Result};
use rust_decimal::Decimal;

const CURRENCY_SYMBOLS: &[char] = &['¥', '￥', '$', '€'];

/// Parses an amount cell like `42.50`, `-1,234.00` or `¥12.30`.
pub fn parse_amount(content: &str) -> Result<Decimal> {
    let mut content = content.trim();
    let negative = if let Some(rest) = content.strip_prefix('-') {
        content = rest.trim_start();
        true
    } else {
        false
    };
    let content = content
        .trim_start_matches(CURRENCY_SYMBOLS)
        .trim_start()
        .replace(',', "");
    if content.is_empty() {
        bail!("Empty amount");
    }
    let amount = Decimal::from_str_exact(&content)
        .map_err(|_| anyhow!("Failed to parse amount {:?}", content))?;
    if amount.is_sign_negative() && negative {
        bail!("Amount has two minus signs");
    }
    Ok(if negative && !amount.is_zero() {
        -amount
    } else {
        amount
    })
}

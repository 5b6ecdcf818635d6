use rust_decimal::Decimal;
use tabsplit_domain::{Currency, Money};

/// `1234.5` → `1,234.50`
pub fn format_amount(amount: Money) -> String {
    let fixed = format!("{:.2}", amount.as_decimal().abs().round_dp(2));
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (idx, digit) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_negative() { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

pub fn format_money(amount: Money, currency: Currency) -> String {
    let formatted = format_amount(amount);
    match formatted.strip_prefix('-') {
        Some(positive) => format!("-{}{positive}", currency.symbol()),
        None => format!("{}{formatted}", currency.symbol()),
    }
}

/// Percentage without trailing zeros: `10`, `7.5`.
pub fn format_rate(rate: Decimal) -> String {
    rate.normalize().to_string()
}

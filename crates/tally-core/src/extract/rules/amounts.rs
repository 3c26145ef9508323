//! Monetary comparison and formatting.

use rust_decimal::Decimal;

/// Absolute slack allowed when comparing computed and stated amounts.
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Whether `actual` is within [`TOLERANCE`] of `expected` (boundary inclusive).
///
/// A difference too large to represent never matches.
pub fn amounts_match(actual: Decimal, expected: Decimal) -> bool {
    actual
        .checked_sub(expected)
        .is_some_and(|diff| diff.abs() <= TOLERANCE)
}

/// Format an amount with two decimals and thousands separators (`USD 1,234.50`).
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    let s = format!("{:.2}", amount.round_dp(2).abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    if amount.is_sign_negative() && !amount.is_zero() {
        formatted.push('-');
    }

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(*c);
    }

    format!("{} {}.{}", currency, formatted, decimal_part)
}

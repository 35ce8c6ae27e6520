//! Field formatting for pipe-delimited EFD records.
//!
//! Downstream parsers are positional, not key/value, so every formatter here
//! is total: a missing or unrepresentable value degrades to the field type's
//! documented empty/zero representation instead of failing. A malformed
//! business fact surfaces as a blank field for the accountant to review; it
//! never aborts the period's filing.

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Format a date as `DDMMYYYY` with no separators. Missing date → empty.
pub fn date(value: Option<NaiveDate>) -> String {
    match value {
        Some(d) => d.format("%d%m%Y").to_string(),
        None => String::new(),
    }
}

/// Format a monetary or rate value with a comma decimal marker and exactly
/// `decimals` digits after it. Missing value → zero at the same scale
/// (`amount(None, 2)` is `"0,00"`, never an empty field).
pub fn amount(value: Option<Decimal>, decimals: u32) -> String {
    let scaled = value.unwrap_or(Decimal::ZERO).round_dp(decimals);
    format!("{:.prec$}", scaled, prec = decimals as usize).replace('.', ",")
}

/// Parse a value previously produced by [`amount`] back into a [`Decimal`].
pub fn parse_amount(value: &str) -> Option<Decimal> {
    value.replace(',', ".").parse().ok()
}

/// Strip everything but ASCII digits from a document identifier (CNPJ, CPF,
/// access key). Missing identifier → empty.
pub fn digits(value: Option<&str>) -> String {
    value
        .map(|v| v.chars().filter(char::is_ascii_digit).collect())
        .unwrap_or_default()
}

/// Free text truncated to `max` characters, never padded. Truncation counts
/// characters, not bytes — razão social strings carry accented characters.
pub fn text(value: Option<&str>, max: usize) -> String {
    value
        .map(|v| v.chars().take(max).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn date_basic() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(date(Some(d)), "05012024");
    }

    #[test]
    fn date_missing_is_empty() {
        assert_eq!(date(None), "");
    }

    #[test]
    fn amount_basic() {
        assert_eq!(amount(Some(dec!(1190)), 2), "1190,00");
        assert_eq!(amount(Some(dec!(24.95)), 2), "24,95");
        assert_eq!(amount(Some(dec!(1.65)), 4), "1,6500");
    }

    #[test]
    fn amount_rounds() {
        assert_eq!(amount(Some(dec!(123.456)), 2), "123,46");
    }

    #[test]
    fn amount_missing_is_scaled_zero() {
        assert_eq!(amount(None, 2), "0,00");
        assert_eq!(amount(None, 4), "0,0000");
    }

    #[test]
    fn parse_amount_inverts_formatting() {
        assert_eq!(parse_amount(&amount(Some(dec!(1234.56)), 2)), Some(dec!(1234.56)));
        assert_eq!(parse_amount("garbage"), None);
    }

    #[test]
    fn digits_strips_punctuation() {
        assert_eq!(digits(Some("12.345.678/0001-95")), "12345678000195");
        assert_eq!(digits(None), "");
    }

    #[test]
    fn text_truncates_on_char_boundary() {
        assert_eq!(text(Some("AÇOUGUE SÃO JOÃO"), 7), "AÇOUGUE");
        assert_eq!(text(Some("abc"), 10), "abc");
        assert_eq!(text(None, 10), "");
    }
}

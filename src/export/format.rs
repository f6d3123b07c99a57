//! Display formatting for exported values

use super::escape::escape_html;
use chrono::{DateTime, Utc};

/// Placeholder for absent values
pub const PLACEHOLDER: &str = "—";

/// Round to two decimals and drop trailing zeros.
///
/// `10.0` → `"10"`, `10.5` → `"10.5"`, `10.555` → `"10.56"`.
pub fn fmt(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    if !rounded.is_finite() {
        return PLACEHOLDER.to_string();
    }
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.fract() == 0.0 {
        return format!("{:.0}", rounded);
    }
    let text = format!("{:.2}", rounded);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Amount with its currency code, or the placeholder
pub fn fmt_amount(amount: Option<f64>, currency: Option<&str>) -> String {
    let Some(amount) = amount else {
        return PLACEHOLDER.to_string();
    };
    match currency.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => format!("{} {}", fmt(amount), escape_html(code)),
        None => fmt(amount),
    }
}

/// Escaped text, or the placeholder when absent or blank
pub fn fmt_text(text: Option<&str>) -> String {
    match text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => escape_html(text),
        None => PLACEHOLDER.to_string(),
    }
}

pub fn fmt_date(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt() {
        assert_eq!(fmt(10.0), "10");
        assert_eq!(fmt(10.5), "10.5");
        assert_eq!(fmt(10.555), "10.56");
        assert_eq!(fmt(0.1 + 0.2), "0.3");
        assert_eq!(fmt(-2.5), "-2.5");
        assert_eq!(fmt(-0.001), "0");
        assert_eq!(fmt(1500.0), "1500");
    }

    #[test]
    fn test_fmt_out_of_range() {
        assert_eq!(fmt(f64::NAN), PLACEHOLDER);
        assert_eq!(fmt(f64::INFINITY), PLACEHOLDER);
        assert_eq!(fmt(f64::MAX), PLACEHOLDER);
        assert_eq!(fmt(-1e307), PLACEHOLDER);
    }

    #[test]
    fn test_fmt_amount() {
        assert_eq!(fmt_amount(None, Some("EUR")), PLACEHOLDER);
        assert_eq!(fmt_amount(Some(10.0), Some("EUR")), "10 EUR");
        assert_eq!(fmt_amount(Some(10.25), None), "10.25");
        assert_eq!(fmt_amount(Some(3.0), Some(" ")), "3");
    }

    #[test]
    fn test_fmt_text() {
        assert_eq!(fmt_text(None), PLACEHOLDER);
        assert_eq!(fmt_text(Some("   ")), PLACEHOLDER);
        assert_eq!(fmt_text(Some("a<b")), "a&lt;b");
    }

    #[test]
    fn test_fmt_date() {
        let at = DateTime::parse_from_rfc3339("2024-03-05T14:07:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(fmt_date(Some(at)), "2024-03-05 14:07");
        assert_eq!(fmt_date(None), PLACEHOLDER);
    }
}

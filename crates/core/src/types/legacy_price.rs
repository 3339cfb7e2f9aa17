//! Price extraction from product card markup.
//!
//! Product cards are expected to carry a `data-price` attribute. Older pages
//! only show the price as text (`"12,50 €"`), so the widget keeps the
//! historical scraping rules for them. These rules are locale-specific and
//! lossy (`"1.234,56"` reads as `1.234`) and are kept exactly as they are:
//! pages already rely on them.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use super::Price;

/// Everything that is not an ASCII digit, a dot or a comma.
static NON_NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.,]").expect("Invalid regex"));

/// Resolve a product price from its attribute or, failing that, its display
/// text.
///
/// The first non-empty source wins: the `data-price` attribute, then the
/// scraped display text, then `"0"`. The winning string is read as a leading
/// decimal number; anything unreadable, non-finite or negative becomes zero,
/// and amounts past the range of [`Decimal`] clamp to its maximum.
#[must_use]
pub fn resolve_price(attribute: Option<&str>, display_text: Option<&str>) -> Price {
    let scraped = display_text.map(scrape_display_text);
    let source = attribute
        .filter(|s| !s.is_empty())
        .or_else(|| scraped.as_deref().filter(|s| !s.is_empty()))
        .unwrap_or("0");

    parse_leading_number(source).map_or(Price::ZERO, |value| {
        Price::new(Price::from_f64_saturating(value).amount().max(Decimal::ZERO))
    })
}

/// Strip a displayed price down to digits and separators, turning the first
/// decimal comma into a dot.
#[must_use]
pub fn scrape_display_text(text: &str) -> String {
    NON_NUMERIC_RE.replace_all(text, "").replacen(',', ".", 1)
}

/// Read the longest decimal number at the start of `input`.
///
/// Leading whitespace is skipped. Accepts an optional sign, digits with an
/// optional fraction, an optional exponent, and `Infinity`. Returns `None`
/// when no number starts the string.
#[must_use]
pub fn parse_leading_number(input: &str) -> Option<f64> {
    let s = input.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    if s.get(end..).is_some_and(|rest| rest.starts_with("Infinity")) {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let int_digits = count_digits(bytes, end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(bytes, end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(bytes, exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    let literal = s.get(..end)?;
    // Rust's float parser rejects a bare trailing dot ("12.").
    literal.trim_end_matches('.').parse::<f64>().ok()
}

fn count_digits(bytes: &[u8], from: usize) -> usize {
    bytes
        .get(from..)
        .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
}

//! Utility functions and helpers

use rust_decimal::{Decimal, RoundingStrategy};

/// Format an integer string with thousands separators.
/// A leading minus sign is kept in front of the grouped digits.
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    let grouped: String = result.chars().rev().collect();
    format!("{}{}", sign, grouped)
}

/// Format an amount with two decimals and thousands separators
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded);
    match text.split_once('.') {
        Some((whole, fraction)) => format!("{}.{}", format_number(whole), fraction),
        None => format_number(text),
    }
}

/// Escape text for inclusion in HTML content or attribute values
pub fn escape_html(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

use rust_decimal::prelude::*;

use crate::constants::LAMPORTS_PER_SOL;

/// Safely convert Lamports (u64) to SOL (f64) for display and arithmetic
pub fn lamports_to_sol(lamports: u64) -> f64 {
    let lamports_dec = Decimal::from(lamports);
    let divisor = Decimal::from(LAMPORTS_PER_SOL);

    (lamports_dec / divisor).to_f64().unwrap_or(0.0)
}

/// Compact human-readable number: 1.5K, 2M, 3.25B, 1T; two decimals below a thousand.
///
/// A non-empty `sign` is appended after a space ("1.5K PEPE").
pub fn format_number(value: f64, sign: &str) -> String {
    const TRILLION: f64 = 1_000_000_000_000.0;
    const BILLION: f64 = 1_000_000_000.0;
    const MILLION: f64 = 1_000_000.0;
    const THOUSAND: f64 = 1_000.0;

    let abs_value = value.abs();

    let scaled = |divisor: f64, suffix: &str| {
        let formatted = format!("{:.2}", value / divisor);
        let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
        format!("{}{}", trimmed, suffix)
    };

    let mut formatted = if abs_value >= TRILLION {
        scaled(TRILLION, "T")
    } else if abs_value >= BILLION {
        scaled(BILLION, "B")
    } else if abs_value >= MILLION {
        scaled(MILLION, "M")
    } else if abs_value >= THOUSAND {
        scaled(THOUSAND, "K")
    } else {
        format!("{:.2}", value)
    };

    if !sign.is_empty() {
        formatted.push(' ');
        formatted.push_str(sign);
    }

    formatted
}

/// Escape text for Telegram's HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// `AbCdEf...WxYz` for addresses and signatures longer than 12 characters
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }

    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

// Parsing and formatting helpers.
//
// Numeric text from the CSV goes through `parse_leading_int`; everything that
// prints a number to the console goes through the `format_*` helpers.
use num_format::{Locale, ToFormattedString};

/// Parse the leading integer of a string-like value.
///
/// - Skips leading whitespace.
/// - Accepts one optional `+` or `-` sign.
/// - Reads the run of ASCII digits that follows and ignores the rest, so
///   `"42 m3"` parses as 42 and `"3.7"` as 3.
/// - Returns `None` when no digit follows, or the value overflows `i64`.
pub fn parse_leading_int(s: Option<&str>) -> Option<i64> {
    let s = s?.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Sum that clamps at `u64::MAX` instead of overflowing.
pub fn saturating_sum<I>(values: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    values.into_iter().fold(0u64, |acc, v| acc.saturating_add(v))
}

/// Share of `part` in `whole` as a percentage; 0 when `whole` is 0.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with the integer part grouped by `format_int`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_val: u64 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let mut res = format_int(int_val);
    if let Some(frac) = parts.next() {
        res.push(',');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::tr)
}

/// Compact rendering for headline numbers: `1.23M`, `45.60K`, or the plain
/// grouped integer below one thousand.
pub fn format_large_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        format_int(n)
    }
}

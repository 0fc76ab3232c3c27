//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

/// Alphabet for participant-facing codes; omits 0/O and 1/I
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Generate a random code of `length` characters from [`CODE_ALPHABET`]
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Registration confirmation code, eight characters
pub fn generate_confirmation_code() -> String {
    generate_code(8)
}

/// Waitlist confirmation code, `WL-` followed by six characters
pub fn generate_waitlist_code() -> String {
    format!("WL-{}", generate_code(6))
}

/// Certificate number in the form `CE-<year>-<six digits>`
pub fn generate_certificate_number(now: DateTime<Utc>) -> String {
    let serial: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("CE-{}-{:06}", now.year(), serial)
}

/// Whole days from `now` until `target`, rounded up
///
/// Negative when `target` is in the past.
pub fn days_until(now: DateTime<Utc>, target: DateTime<Utc>) -> i64 {
    ceil_div(target.signed_duration_since(now).num_milliseconds(), MILLIS_PER_DAY)
}

/// Whole days `now` is past `deadline`, rounded up
pub fn days_overdue(now: DateTime<Utc>, deadline: DateTime<Utc>) -> i64 {
    ceil_div(now.signed_duration_since(deadline).num_milliseconds(), MILLIS_PER_DAY)
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    let quotient = numerator / denominator;
    if numerator % denominator > 0 {
        quotient + 1
    } else {
        quotient
    }
}

/// Round to one decimal place
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Percentage of `part` in `whole`, rounded to the nearest integer
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Format a timestamp for display
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Truncate text to a maximum number of characters with ellipsis
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

/// Loose email shape check
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid")
    });
    re.is_match(email)
}

/// Absolute http(s) URL, as accepted for provider websites and document links
pub fn is_valid_web_url(raw: &str) -> bool {
    match url::Url::parse(raw.trim()) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some(),
        Err(_) => false,
    }
}

/// Escape text for inclusion in HTML documents
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
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

//! Shared helper functions for CLI commands
//!
//! Formatting and input helpers used across multiple command modules.

use chrono::{DateTime, NaiveDate, Utc};
use std::io::{self, BufRead, IsTerminal};

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Escape a cell for markdown tables
pub fn escape_md(s: &str) -> String {
    s.replace('|', "\\|")
}

/// Date portion of an optional timestamp, or "-"
pub fn format_date(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Signed day count ("+2", "-1", "0"), or "-" when unknown
pub fn format_days(days: Option<i64>) -> String {
    match days {
        Some(d) if d > 0 => format!("+{}", d),
        Some(d) => d.to_string(),
        None => "-".to_string(),
    }
}

/// Unsigned day count, or "-" when unknown
pub fn format_duration(days: Option<i64>) -> String {
    days.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Average with one decimal, or "no data"
pub fn format_average(avg: Option<f64>) -> String {
    avg.map(|a| format!("{:+.1}", a))
        .unwrap_or_else(|| "no data".to_string())
}

/// Ratio as a percentage, or "no data"
pub fn format_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| "no data".to_string())
}

/// Currency amount with thousands separators and no cents
pub fn format_money(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Parse `--as-of`: a plain date (midnight UTC) or a full RFC 3339 timestamp
pub fn parse_as_of(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(s) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("Invalid date: {}. Use YYYY-MM-DD or RFC 3339", s))
}

/// Read order IDs from stdin if available (Unix philosophy support)
///
/// Returns `Some(Vec<String>)` with IDs if stdin is piped (not a terminal),
/// or `None` if stdin is a terminal (interactive mode).
///
/// IDs are read one per line, with empty lines and whitespace-only lines ignored.
pub fn read_ids_from_stdin() -> Option<Vec<String>> {
    let stdin = io::stdin();

    // Only read from stdin if it's piped (not a terminal)
    if stdin.is_terminal() {
        return None;
    }

    let ids: Vec<String> = stdin
        .lock()
        .lines()
        .map_while(|line| line.ok())
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

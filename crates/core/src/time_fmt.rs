// SPDX-License-Identifier: MIT

//! Human-readable elapsed-time formatting for logs and feedback text.

use std::time::Duration;

/// Format a duration as `"1h2m3s"`-style elapsed text, omitting zero units
/// except when the whole duration is zero (`"0s"`).
pub fn format_elapsed(d: Duration) -> String {
    let total = d.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 || hours > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&format!("{seconds}s"));
    out
}

/// Parses a `^\d+[smhd]$` duration spec (e.g. `"5m"`, `"2h"`, `"30s"`, `"1d"`)
/// into a [`Duration`]. Used for gate-plan `timeout`/`maxWallClock` fields.
pub fn parse_duration_spec(spec: &str) -> Option<Duration> {
    let spec = spec.trim();
    let (digits, unit) = spec.split_at(spec.len().checked_sub(1)?);
    if digits.is_empty() {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;
    let secs = match unit {
        "s" => amount,
        "m" => amount.checked_mul(60)?,
        "h" => amount.checked_mul(3_600)?,
        "d" => amount.checked_mul(86_400)?,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_unit() {
        assert_eq!(parse_duration_spec("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration_spec("5m"), Some(Duration::from_secs(300)));
        assert_eq!(parse_duration_spec("2h"), Some(Duration::from_secs(7_200)));
        assert_eq!(parse_duration_spec("1d"), Some(Duration::from_secs(86_400)));
    }

    #[test]
    fn rejects_malformed_specs() {
        assert_eq!(parse_duration_spec("5"), None);
        assert_eq!(parse_duration_spec("m"), None);
        assert_eq!(parse_duration_spec("5x"), None);
        assert_eq!(parse_duration_spec(""), None);
    }

    #[test]
    fn formats_zero() {
        assert_eq!(format_elapsed(Duration::ZERO), "0s");
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_elapsed(Duration::from_secs(125)), "2m5s");
    }

    #[test]
    fn formats_hours() {
        assert_eq!(format_elapsed(Duration::from_secs(3661)), "1h1m1s");
    }
}

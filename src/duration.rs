//! Human-readable durations in config files: "500ms", "30s", "2m", "1h".

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};

/// Parse a duration like "30s".
///
/// Units are `ms`, `s`, `m` and `h`; input is trimmed and case-insensitive.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .context("Duration must end with ms, s, m, or h")?;
    let (num, unit) = s.split_at(split);

    let num: u64 = num.parse().context("Invalid number in duration")?;
    let duration = match unit {
        "ms" => Duration::from_millis(num),
        "s" => Duration::from_secs(num),
        "m" => Duration::from_secs(num.checked_mul(60).context("Duration is too large")?),
        "h" => Duration::from_secs(num.checked_mul(60 * 60).context("Duration is too large")?),
        _ => anyhow::bail!("Unknown duration unit {unit:?}; use ms, s, m, or h"),
    };
    Ok(duration)
}

/// Serde helper for an optional duration field; `"off"` means none.
pub fn deserialize_optional_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    if s.trim().eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    parse_duration(&s)
        .map(Some)
        .map_err(|e| serde::de::Error::custom(format!("{e:#}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_trims_and_ignores_case() {
        assert_eq!(parse_duration("  45S ").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("10MS").unwrap(), Duration::from_millis(10));
    }

    #[test]
    fn test_parse_rejects() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("30").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("1.5s").is_err());
        assert!(parse_duration("3d").is_err());
        assert!(parse_duration("-1s").is_err());
        assert!(parse_duration("99999999999999999999h").is_err());
    }
}

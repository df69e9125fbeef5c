//! Parsers for the display strings found in portal table cells.
//!
//! Every parser is strict: input outside the accepted form is a
//! [`FieldError`] naming the raw string and what was expected. Optional
//! cells go through [`optional`], which separates "cell is empty" from
//! "cell is malformed".

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use regex::Regex;

/// Zone every portal timestamp is expressed in.
pub const PORTAL_ZONE: Tz = chrono_tz::Australia::Sydney;

/// Layout of the date/time cell once its `<br>`-separated parts are joined.
pub const TIMESTAMP_FORMAT: &str = "%a %d/%m/%Y %H:%M";

// ASCII digits only.
const AMOUNT_PATTERN: &str = r"^(-?)\$([0-9]+)\.([0-9]{2})$";

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(AMOUNT_PATTERN).expect("amount pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{value:?} does not match {expected}")]
pub struct FieldError {
    pub value: String,
    pub expected: String,
}

impl FieldError {
    fn new(value: &str, expected: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            expected: expected.into(),
        }
    }
}

/// Parse a dollar amount such as `$4.10` or `-$4.10` into cents.
pub fn parse_amount(s: &str) -> Result<i64, FieldError> {
    let caps = AMOUNT_RE
        .captures(s)
        .ok_or_else(|| FieldError::new(s, format!("/{AMOUNT_PATTERN}/")))?;

    let overflow = || FieldError::new(s, "an amount that fits in 64 bits");
    let dollars: i64 = caps[2].parse().map_err(|_| overflow())?;
    // Exactly two digits, so this can't fail.
    let cents: i64 = caps[3].parse().map_err(|_| overflow())?;

    let total = dollars
        .checked_mul(100)
        .and_then(|d| d.checked_add(cents))
        .ok_or_else(overflow)?;

    Ok(if &caps[1] == "-" { -total } else { total })
}

/// Parse a timestamp like `Tue 29/09/2015 07:47` as wall-clock time in `zone`.
///
/// The weekday must agree with the date. When the wall-clock time occurs
/// twice (end of daylight saving) the earlier instant is used; a time that
/// never occurs (start of daylight saving) is rejected.
pub fn parse_timestamp(s: &str, zone: Tz) -> Result<DateTime<Tz>, FieldError> {
    let expected = || format!("{TIMESTAMP_FORMAT:?} in {}", zone.name());

    let naive = NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|_| FieldError::new(s, expected()))?;

    zone.from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| FieldError::new(s, format!("{} (no such local time)", expected())))
}

/// Parse a plain decimal integer (transaction and journey numbers).
pub fn parse_decimal<T: FromStr>(s: &str) -> Result<T, FieldError> {
    s.parse()
        .map_err(|_| FieldError::new(s, "a decimal integer"))
}

/// Parse a cell that may legitimately be empty.
///
/// An empty (or all-whitespace) cell is `Ok(None)`; anything else must
/// satisfy `parser`.
pub fn optional<T>(
    raw: &str,
    parser: impl FnOnce(&str) -> Result<T, FieldError>,
) -> Result<Option<T>, FieldError> {
    let raw = raw.trim();
    if raw.is_empty() {
        Ok(None)
    } else {
        parser(raw).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$0.00").unwrap(), 0);
        assert_eq!(parse_amount("$100.00").unwrap(), 10000);
        assert_eq!(parse_amount("$4.10").unwrap(), 410);
        assert_eq!(parse_amount("-$4.10").unwrap(), -410);
    }

    #[test]
    fn test_parse_amount_rejects_other_forms() {
        for bad in [
            "", "4.10", "$4.1", "$4.100", "$4", "$.10", "$-4.10", "+$4.10", " $4.10", "$4.10 ",
            "$4,10", "$1,000.00", "€4.10", "$٤.١٠", "$4.١٠",
        ] {
            let err = parse_amount(bad).unwrap_err();
            assert_eq!(err.value, bad);
            assert!(err.expected.contains(r"\$"), "pattern missing from {err}");
        }
    }

    #[test]
    fn test_parse_amount_overflow() {
        let err = parse_amount("$99999999999999999999.00").unwrap_err();
        assert!(err.expected.contains("64 bits"));
    }

    #[test]
    fn test_parse_timestamp_in_portal_zone() {
        let when = parse_timestamp("Tue 29/09/2015 07:47", PORTAL_ZONE).unwrap();
        assert_eq!(when.timezone(), PORTAL_ZONE);
        assert_eq!((when.year(), when.month(), when.day()), (2015, 9, 29));
        assert_eq!((when.hour(), when.minute()), (7, 47));
        // AEST, +10:00.
        assert_eq!(when.naive_utc().to_string(), "2015-09-28 21:47:00");
    }

    #[test]
    fn test_parse_timestamp_ignores_caller_zone() {
        let sydney = parse_timestamp("Wed 09/07/2014 17:01", PORTAL_ZONE).unwrap();
        let utc = parse_timestamp("Wed 09/07/2014 17:01", chrono_tz::UTC).unwrap();
        assert_eq!(
            (utc.timestamp() - sydney.timestamp()) / 3600,
            10,
            "Sydney is ten hours ahead in July"
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_malformed() {
        for bad in [
            "",
            "29/09/2015 07:47",
            "Tue 2015-09-29 07:47",
            "Tue 29/09/2015",
            "Tue 29/09/2015 7:47pm",
            // Wrong weekday for the date.
            "Mon 29/09/2015 07:47",
        ] {
            let err = parse_timestamp(bad, PORTAL_ZONE).unwrap_err();
            assert_eq!(err.value, bad);
            assert!(err.expected.contains("Australia/Sydney"));
        }
    }

    #[test]
    fn test_parse_timestamp_daylight_saving_edges() {
        // Clocks went forward at 02:00 on 4 October 2015.
        assert!(parse_timestamp("Sun 04/10/2015 02:30", PORTAL_ZONE).is_err());

        // Clocks went back at 03:00 on 5 April 2015; 02:30 happened twice.
        let when = parse_timestamp("Sun 05/04/2015 02:30", PORTAL_ZONE).unwrap();
        assert_eq!(when.naive_utc().to_string(), "2015-04-04 15:30:00");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal::<u32>("6").unwrap(), 6);
        assert_eq!(parse_decimal::<u32>("0042").unwrap(), 42);
        assert!(parse_decimal::<u32>("six").is_err());
        assert!(parse_decimal::<u32>("").is_err());
        assert!(parse_decimal::<u32>("-1").is_err());
    }

    #[test]
    fn test_optional_distinguishes_absent_from_malformed() {
        assert_eq!(optional("", parse_amount), Ok(None));
        assert_eq!(optional("  \n\t ", parse_amount), Ok(None));
        assert_eq!(optional(" $3.50 ", parse_amount), Ok(Some(350)));

        let err = optional("3.50", parse_amount).unwrap_err();
        assert_eq!(err.value, "3.50");
    }
}

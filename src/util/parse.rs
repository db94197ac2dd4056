use chrono::{DateTime, Utc};
use std::num::NonZeroU64;

use crate::error::config::ConfigError;

/// Parses a Discord ID (snowflake) from a command line value
///
/// # Arguments
/// - `value` - The string to attempt to parse into `u64`
///
/// # Returns
/// - `Ok(u64)` - Successfully parsed the ID
/// - `Err(ConfigError::InvalidId)` - The value is not a non-zero unsigned integer
pub fn parse_snowflake(value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<NonZeroU64>()
        .map(NonZeroU64::get)
        .map_err(|e| ConfigError::InvalidId {
            value: value.to_string(),
            source: e,
        })
}

/// Parses an RFC 3339 instant such as `2023-01-01T00:00:00Z`, normalized to UTC
///
/// # Arguments
/// - `value` - The string to attempt to parse
///
/// # Returns
/// - `Ok(DateTime<Utc>)` - Successfully parsed instant
/// - `Err(ConfigError::InvalidTimestamp)` - The value is not an RFC 3339 instant
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, ConfigError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| ConfigError::InvalidTimestamp {
            value: value.to_string(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_snowflake() {
        assert_eq!(parse_snowflake("175928847299117063").unwrap(), 175928847299117063);
    }

    #[test]
    fn rejects_non_numeric_snowflake() {
        let result = parse_snowflake("general");

        assert!(matches!(result, Err(ConfigError::InvalidId { .. })));
    }

    #[test]
    fn rejects_negative_snowflake() {
        assert!(parse_snowflake("-12").is_err());
    }

    #[test]
    fn rejects_zero_snowflake() {
        assert!(parse_snowflake("0").is_err());
    }

    /// Tests that offsets are normalized to UTC.
    #[test]
    fn parses_instant_with_offset() {
        let instant = parse_instant("2023-01-01T02:00:00+02:00").unwrap();

        assert_eq!(instant, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_date_without_time() {
        let result = parse_instant("2023-01-01");

        assert!(matches!(result, Err(ConfigError::InvalidTimestamp { .. })));
    }
}

//! Snowflake ID arithmetic.
//!
//! Discord IDs embed their creation time in the upper 42 bits as milliseconds since
//! the Discord epoch, which makes them globally ordered by creation time. The message
//! cursor relies on this: "messages after snowflake X" means "messages created after
//! the instant encoded in X".

use chrono::{DateTime, Utc};

/// First second of 2015, in Unix milliseconds.
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

const TIMESTAMP_SHIFT: u32 = 22;

/// Extracts the creation instant embedded in a snowflake.
pub fn timestamp_of(id: u64) -> DateTime<Utc> {
    let ms = (id >> TIMESTAMP_SHIFT) as i64 + DISCORD_EPOCH_MS;
    DateTime::from_timestamp_millis(ms).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Builds the smallest snowflake for the given instant.
///
/// Instants before the Discord epoch saturate to zero.
pub fn from_timestamp(instant: DateTime<Utc>) -> u64 {
    let ms = (instant.timestamp_millis() - DISCORD_EPOCH_MS).max(0) as u64;
    ms << TIMESTAMP_SHIFT
}

/// Builds the largest snowflake of the millisecond containing `instant`.
///
/// Fetching after this ID returns only objects created strictly after that
/// millisecond.
pub fn last_of_millisecond(instant: DateTime<Utc>) -> u64 {
    from_timestamp(instant) | ((1 << TIMESTAMP_SHIFT) - 1)
}

/// Derives the message fetch cursor for a channel.
///
/// Defaults to the channel's own ID, which covers the full history since the channel
/// was created. When a cutoff is given and it is later than the channel creation
/// time, the cursor narrows the fetch to messages created after the cutoff.
///
/// # Arguments
/// - `channel_id` - Snowflake of the source channel
/// - `after` - Optional cutoff instant
///
/// # Returns
/// - `u64` - Snowflake to fetch messages after
pub fn channel_cursor(channel_id: u64, after: Option<DateTime<Utc>>) -> u64 {
    match after {
        Some(cutoff) if cutoff > timestamp_of(channel_id) => last_of_millisecond(cutoff),
        _ => channel_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    /// Tests extracting the timestamp from a known snowflake.
    ///
    /// Expected: creation instant of Discord's documentation example ID
    #[test]
    fn extracts_timestamp_from_snowflake() {
        let instant = timestamp_of(175928847299117063);

        assert_eq!(instant.timestamp_millis(), 1_462_015_105_796);
    }

    /// Tests that building and extracting a snowflake round-trips to the millisecond.
    #[test]
    fn builds_snowflake_from_timestamp() {
        let instant = Utc.with_ymd_and_hms(2023, 5, 17, 12, 30, 0).unwrap();

        assert_eq!(timestamp_of(from_timestamp(instant)), instant);
        assert_eq!(timestamp_of(last_of_millisecond(instant)), instant);
        assert!(last_of_millisecond(instant) > from_timestamp(instant));
    }

    /// Tests that instants before the Discord epoch saturate to zero.
    #[test]
    fn saturates_before_epoch() {
        let instant = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(from_timestamp(instant), 0);
    }

    /// Tests cursor derivation without a cutoff.
    ///
    /// Expected: the channel ID itself
    #[test]
    fn cursor_defaults_to_channel_id() {
        let channel_id = from_timestamp(Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap());

        assert_eq!(channel_cursor(channel_id, None), channel_id);
    }

    /// Tests cursor derivation with a cutoff older than the channel.
    ///
    /// Expected: the channel ID, since nothing predates the channel
    #[test]
    fn cursor_ignores_cutoff_before_channel_creation() {
        let created = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let channel_id = from_timestamp(created);

        let cursor = channel_cursor(channel_id, Some(created - Duration::days(30)));

        assert_eq!(cursor, channel_id);
    }

    /// Tests cursor derivation with a cutoff newer than the channel.
    ///
    /// Expected: a synthetic cursor after which only later messages are fetched
    #[test]
    fn cursor_uses_cutoff_after_channel_creation() {
        let created = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        let cutoff = created + Duration::days(30);
        let channel_id = from_timestamp(created);

        let cursor = channel_cursor(channel_id, Some(cutoff));

        assert_eq!(cursor, last_of_millisecond(cutoff));
        assert!(from_timestamp(cutoff) <= cursor);
        assert!(from_timestamp(cutoff + Duration::milliseconds(1)) > cursor);
    }
}

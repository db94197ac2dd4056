use thiserror::Error;

/// Internal issues indicating malformed remote data or possible bugs
#[derive(Error, Debug)]
pub enum InternalError {
    /// A source embed has an author block without a name.
    ///
    /// Discord requires the name whenever an embed author is present, so this only
    /// happens with malformed input. The message carrying the embed is skipped.
    #[error("Embed author has no name (message {message_id})")]
    EmbedAuthorWithoutName {
        /// The source message carrying the malformed embed
        message_id: u64,
    },

    /// Failure to convert Unix timestamp to Discord timestamp
    ///
    /// Occurs when a valid Unix timestamp cannot be converted to Discord's
    /// timestamp format, typically due to timestamp being out of range.
    #[error("Failed to convert Unix timestamp {timestamp} to Discord timestamp: {reason}")]
    InvalidDiscordTimestamp {
        /// The Unix timestamp that failed to convert
        timestamp: i64,
        /// The reason for conversion failure
        reason: String,
    },

    /// Discord answered a channel creation with nothing usable or a channel of
    /// another kind.
    #[error("Created channel {name} was not returned as a {expected}")]
    UnexpectedChannelKind {
        /// Name of the requested channel
        name: String,
        /// Requested kind: "category", "text channel" or "voice channel"
        expected: &'static str,
    },
}

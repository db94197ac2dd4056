use std::num::ParseIntError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is not set.
    ///
    /// The application requires this environment variable to be defined. Check the
    /// documentation or `.env` file for required configuration variables.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// A Discord ID given on the command line is not an unsigned integer.
    #[error("Invalid Discord ID '{value}': {source}")]
    InvalidId {
        /// The string value that failed to parse
        value: String,
        /// The underlying parse error
        #[source]
        source: ParseIntError,
    },

    /// A timestamp given on the command line is not an RFC 3339 instant.
    #[error("Invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        /// The string value that failed to parse
        value: String,
        /// The underlying parse error
        #[source]
        source: chrono::ParseError,
    },

    /// The source or destination guild could not be resolved.
    ///
    /// The bot must be a member of both guilds for them to be visible.
    #[error("Invalid {role} guild: {guild_id}")]
    UnknownGuild {
        /// Either "source", "destination" or "server"
        role: &'static str,
        /// The guild ID that was requested
        guild_id: u64,
    },
}

use crate::error::{config::ConfigError, AppError};

/// User agent sent with attachment downloads.
pub const USER_AGENT: &str = concat!("GuildTransfer (v", env!("CARGO_PKG_VERSION"), ")");

pub struct Config {
    pub discord_token: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self {
            discord_token: std::env::var("DISCORD_TOKEN")
                .map_err(|_| ConfigError::MissingEnvVar("DISCORD_TOKEN".to_string()))?,
        })
    }
}

use serenity::http::Http;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::{Config, USER_AGENT},
    data::discord::{DirectoryClient, SerenityDirectory},
    error::AppError,
};

/// Builds the HTTP client used to download attachments.
///
/// # Returns
/// - `Ok(reqwest::Client)` - Client sending the tool's user agent
/// - `Err(AppError::ReqwestErr)` - The TLS backend could not be initialized
pub fn setup_reqwest_client() -> Result<reqwest::Client, AppError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(60))
        .build()?;

    Ok(client)
}

/// Logs in to Discord and builds the production directory client.
///
/// The token is verified by fetching the current user before any command runs, so
/// an invalid token fails the invocation early.
///
/// # Arguments
/// - `config` - Application configuration holding the Discord token
///
/// # Returns
/// - `Ok(Arc<dyn DirectoryClient>)` - Client for both guilds of the run
/// - `Err(AppError::DiscordErr)` - Login failed
/// - `Err(AppError::ReqwestErr)` - The attachment client could not be built
pub async fn connect_to_discord(config: &Config) -> Result<Arc<dyn DirectoryClient>, AppError> {
    let http = Arc::new(Http::new(&config.discord_token));
    let directory = SerenityDirectory::new(http, setup_reqwest_client()?);

    let account = directory.current_user().await?;
    tracing::info!("Logged in as {} ({})", account.name, account.id);

    Ok(Arc::new(directory))
}

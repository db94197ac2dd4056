//! Remote directory client.
//!
//! `DirectoryClient` is the only way the migration talks to Discord. The production
//! implementation wraps Serenity's REST client; tests use an in-memory directory.
//! All methods are remote calls and may suspend the calling branch.

pub mod http;
#[cfg(test)]
pub mod memory;

use serenity::async_trait;

use crate::{
    error::AppError,
    model::discord::{
        Account, Category, CreateTextChannelParam, CreateVoiceChannelParam, DirectoryChannel,
        Guild, OutgoingMessage, SourceMessage, TextChannel, VoiceChannel,
    },
};

pub use http::SerenityDirectory;

/// Maximum page size accepted by Discord for message history requests.
pub const MESSAGE_PAGE_SIZE: u8 = 100;

#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Returns the account the client is authenticated as.
    async fn current_user(&self) -> Result<Account, AppError>;

    /// Resolves a guild by ID.
    ///
    /// # Returns
    /// - `Ok(Some(Guild))` - The guild exists and is visible to the acting account
    /// - `Ok(None)` - The ID is well-formed but no such guild is visible
    /// - `Err(AppError)` - The lookup itself failed
    async fn get_guild(&self, guild_id: u64) -> Result<Option<Guild>, AppError>;

    /// Resolves a channel by ID, restricted to the given guild.
    ///
    /// # Returns
    /// - `Ok(Some(DirectoryChannel))` - A category, text or voice channel of the guild
    /// - `Ok(None)` - Absent, inaccessible, of another guild or of an unsupported kind
    /// - `Err(AppError)` - The lookup itself failed
    async fn get_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<Option<DirectoryChannel>, AppError>;

    /// Lists every supported channel of a guild, categories included.
    async fn list_channels(&self, guild_id: u64) -> Result<Vec<DirectoryChannel>, AppError>;

    async fn create_category(&self, guild_id: u64, name: &str) -> Result<Category, AppError>;

    async fn create_text_channel(
        &self,
        guild_id: u64,
        param: CreateTextChannelParam,
    ) -> Result<TextChannel, AppError>;

    async fn create_voice_channel(
        &self,
        guild_id: u64,
        param: CreateVoiceChannelParam,
    ) -> Result<VoiceChannel, AppError>;

    /// Fetches one page of messages created after the cursor.
    ///
    /// # Arguments
    /// - `channel_id` - Source text channel
    /// - `after` - Snowflake cursor; only messages with a greater ID are returned
    /// - `limit` - Page size, at most `MESSAGE_PAGE_SIZE`
    ///
    /// # Returns
    /// - `Ok(Vec<SourceMessage>)` - Up to `limit` messages in ascending ID order
    /// - `Err(AppError)` - The request failed
    async fn messages_after(
        &self,
        channel_id: u64,
        after: u64,
        limit: u8,
    ) -> Result<Vec<SourceMessage>, AppError>;

    /// Creates a message and returns the new message ID.
    async fn create_message(
        &self,
        channel_id: u64,
        message: OutgoingMessage,
    ) -> Result<u64, AppError>;

    /// Adds a reaction by the acting account.
    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), AppError>;

    /// Removes the acting account's own reaction.
    async fn remove_own_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), AppError>;

    /// Downloads the raw bytes of an attachment.
    ///
    /// # Returns
    /// - `Ok(Vec<u8>)` - The attachment content
    /// - `Err(AppError::AttachmentHttp)` - The server answered with a non-success status
    /// - `Err(AppError::ReqwestErr)` - The transfer failed
    async fn fetch_attachment(&self, url: &str) -> Result<Vec<u8>, AppError>;
}

use serenity::{
    all::{
        Channel, ChannelId, ChannelType, CreateAttachment, CreateChannel, CreateEmbed,
        CreateEmbedAuthor, CreateEmbedFooter, CreateMessage, GetMessages, GuildId, MessageId,
        ReactionType, Timestamp,
    },
    async_trait,
    http::Http,
};
use std::sync::Arc;

use crate::{
    data::discord::{DirectoryClient, MESSAGE_PAGE_SIZE},
    error::{internal::InternalError, AppError},
    model::discord::{
        Account, Category, CreateTextChannelParam, CreateVoiceChannelParam, DirectoryChannel,
        EmbedPayload, Guild, OutgoingMessage, SourceMessage, TextChannel, VoiceChannel,
    },
};

/// `DirectoryClient` backed by the Discord REST API.
///
/// Discord calls go through Serenity's `Http`, which handles authentication and rate
/// limit buckets. Attachments live on Discord's CDN and are downloaded with a separate
/// `reqwest::Client` carrying the tool's user agent.
pub struct SerenityDirectory {
    http: Arc<Http>,
    attachments: reqwest::Client,
}

impl SerenityDirectory {
    /// Creates a new SerenityDirectory.
    ///
    /// # Arguments
    /// - `http` - Authenticated Discord HTTP client
    /// - `attachments` - HTTP client used for attachment downloads
    ///
    /// # Returns
    /// - `SerenityDirectory` - New client instance
    pub fn new(http: Arc<Http>, attachments: reqwest::Client) -> Self {
        Self { http, attachments }
    }

    async fn create_channel(
        &self,
        guild_id: u64,
        builder: CreateChannel<'_>,
    ) -> Result<Option<DirectoryChannel>, AppError> {
        let channel = GuildId::new(guild_id)
            .create_channel(&self.http, builder)
            .await?;

        Ok(DirectoryChannel::from_serenity(&channel))
    }
}

/// Converts a lookup failure into `None` when Discord reports the ID as absent or
/// inaccessible.
fn absent_as_none<T>(result: Result<T, serenity::Error>) -> Result<Option<T>, AppError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            let err = AppError::from(err);
            match err.discord_status() {
                Some(403) | Some(404) => Ok(None),
                _ => Err(err),
            }
        }
    }
}

/// Converts an instant to a Discord timestamp, keeping millisecond precision.
fn to_timestamp(instant: chrono::DateTime<chrono::Utc>) -> Result<Timestamp, AppError> {
    let formatted = instant.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

    Timestamp::parse(&formatted).map_err(|e| {
        AppError::InternalErr(InternalError::InvalidDiscordTimestamp {
            timestamp: instant.timestamp(),
            reason: e.to_string(),
        })
    })
}

/// Narrows a freshly created channel to the kind that was requested.
///
/// # Returns
/// - `Ok(T)` - The created channel as the requested kind
/// - `Err(AppError::InternalErr(InternalError::UnexpectedChannelKind))` - Discord
///   returned nothing usable or a channel of another kind
fn created_as<T>(
    created: Option<DirectoryChannel>,
    name: &str,
    expected: &'static str,
    narrow: impl FnOnce(DirectoryChannel) -> Option<T>,
) -> Result<T, AppError> {
    created.and_then(narrow).ok_or_else(|| {
        InternalError::UnexpectedChannelKind {
            name: name.to_string(),
            expected,
        }
        .into()
    })
}

/// Builds the Serenity embed for one outgoing embed payload.
fn build_embed(payload: EmbedPayload) -> Result<CreateEmbed, AppError> {
    let mut embed = CreateEmbed::new();

    if let Some((name, url, icon_url)) = payload.author {
        let mut author = CreateEmbedAuthor::new(name);
        if let Some(url) = url {
            author = author.url(url);
        }
        if let Some(icon_url) = icon_url {
            author = author.icon_url(icon_url);
        }
        embed = embed.author(author);
    }
    if let Some(title) = payload.title {
        embed = embed.title(title);
    }
    if let Some(url) = payload.url {
        embed = embed.url(url);
    }
    if let Some(color) = payload.color {
        embed = embed.colour(color);
    }
    if let Some(thumbnail) = payload.thumbnail {
        embed = embed.thumbnail(thumbnail);
    }
    if let Some(description) = payload.description {
        embed = embed.description(description);
    }
    if let Some(image) = payload.image {
        embed = embed.image(image);
    }
    for field in payload.fields {
        embed = embed.field(field.name, field.value, field.inline);
    }
    if let Some(timestamp) = payload.timestamp {
        embed = embed.timestamp(to_timestamp(timestamp)?);
    }
    if let Some((text, icon_url)) = payload.footer {
        let mut footer = CreateEmbedFooter::new(text);
        if let Some(icon_url) = icon_url {
            footer = footer.icon_url(icon_url);
        }
        embed = embed.footer(footer);
    }

    Ok(embed)
}

#[async_trait]
impl DirectoryClient for SerenityDirectory {
    async fn current_user(&self) -> Result<Account, AppError> {
        let user = self.http.get_current_user().await?;

        Ok(Account {
            id: user.id.get(),
            name: user.name.clone(),
        })
    }

    async fn get_guild(&self, guild_id: u64) -> Result<Option<Guild>, AppError> {
        let guild = absent_as_none(self.http.get_guild(GuildId::new(guild_id)).await)?;

        Ok(guild.as_ref().map(Guild::from_serenity))
    }

    async fn get_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<Option<DirectoryChannel>, AppError> {
        let channel = absent_as_none(self.http.get_channel(ChannelId::new(channel_id)).await)?;

        Ok(match channel {
            Some(Channel::Guild(channel)) if channel.guild_id.get() == guild_id => {
                DirectoryChannel::from_serenity(&channel)
            }
            _ => None,
        })
    }

    async fn list_channels(&self, guild_id: u64) -> Result<Vec<DirectoryChannel>, AppError> {
        let channels = self.http.get_channels(GuildId::new(guild_id)).await?;

        Ok(channels
            .iter()
            .filter_map(DirectoryChannel::from_serenity)
            .collect())
    }

    async fn create_category(&self, guild_id: u64, name: &str) -> Result<Category, AppError> {
        let builder = CreateChannel::new(name).kind(ChannelType::Category);
        let created = self.create_channel(guild_id, builder).await?;

        created_as(created, name, "category", |channel| match channel {
            DirectoryChannel::Category(category) => Some(category),
            _ => None,
        })
    }

    async fn create_text_channel(
        &self,
        guild_id: u64,
        param: CreateTextChannelParam,
    ) -> Result<TextChannel, AppError> {
        let mut builder = CreateChannel::new(param.name.clone())
            .kind(ChannelType::Text)
            .nsfw(param.nsfw)
            .position(param.position);
        if let Some(topic) = param.topic {
            builder = builder.topic(topic);
        }
        if let Some(parent_id) = param.parent_id {
            builder = builder.category(ChannelId::new(parent_id));
        }

        let created = self.create_channel(guild_id, builder).await?;

        created_as(created, &param.name, "text channel", |channel| match channel {
            DirectoryChannel::Text(channel) => Some(channel),
            _ => None,
        })
    }

    async fn create_voice_channel(
        &self,
        guild_id: u64,
        param: CreateVoiceChannelParam,
    ) -> Result<VoiceChannel, AppError> {
        let mut builder = CreateChannel::new(param.name.clone())
            .kind(ChannelType::Voice)
            .position(param.position);
        if let Some(parent_id) = param.parent_id {
            builder = builder.category(ChannelId::new(parent_id));
        }

        let created = self.create_channel(guild_id, builder).await?;

        created_as(created, &param.name, "voice channel", |channel| match channel {
            DirectoryChannel::Voice(channel) => Some(channel),
            _ => None,
        })
    }

    async fn messages_after(
        &self,
        channel_id: u64,
        after: u64,
        limit: u8,
    ) -> Result<Vec<SourceMessage>, AppError> {
        let mut request = GetMessages::new().limit(limit.min(MESSAGE_PAGE_SIZE));
        if after > 0 {
            request = request.after(MessageId::new(after));
        }

        let page = ChannelId::new(channel_id)
            .messages(&self.http, request)
            .await?;

        // Discord returns newest first regardless of the cursor direction
        let mut messages: Vec<SourceMessage> =
            page.iter().map(SourceMessage::from_serenity).collect();
        messages.sort_by_key(|message| message.id);

        tracing::trace!(
            "Fetched {} messages after {} in channel {}",
            messages.len(),
            after,
            channel_id
        );

        Ok(messages)
    }

    async fn create_message(
        &self,
        channel_id: u64,
        message: OutgoingMessage,
    ) -> Result<u64, AppError> {
        let embeds = message
            .embeds
            .into_iter()
            .map(build_embed)
            .collect::<Result<Vec<_>, _>>()?;
        let files = message
            .files
            .into_iter()
            .map(|file| CreateAttachment::bytes(file.data, file.filename));

        let created = ChannelId::new(channel_id)
            .send_message(&self.http, CreateMessage::new().embeds(embeds).add_files(files))
            .await?;

        Ok(created.id.get())
    }

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), AppError> {
        self.http
            .create_reaction(
                ChannelId::new(channel_id),
                MessageId::new(message_id),
                &ReactionType::Unicode(emoji.to_string()),
            )
            .await?;

        Ok(())
    }

    async fn remove_own_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), AppError> {
        self.http
            .delete_reaction_me(
                ChannelId::new(channel_id),
                MessageId::new(message_id),
                &ReactionType::Unicode(emoji.to_string()),
            )
            .await?;

        Ok(())
    }

    async fn fetch_attachment(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let response = self.attachments.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AttachmentHttp {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

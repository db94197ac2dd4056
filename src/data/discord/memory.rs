//! In-memory `DirectoryClient` for service tests.
//!
//! Holds guilds, channels and messages in a `RwLock`-guarded state and records every
//! message created and every attachment URL fetched. Failures can be injected per
//! channel name, per channel, per guild or per message content to exercise the
//! branch and message isolation paths.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serenity::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::{
    data::discord::DirectoryClient,
    error::AppError,
    model::discord::{
        Account, Category, CreateTextChannelParam, CreateVoiceChannelParam, DirectoryChannel,
        Guild, MessageKind, OutgoingMessage, RawAuthor, Reaction, SourceMessage, TextChannel,
        VoiceChannel,
    },
    util::snowflake,
};

/// ID of the account the in-memory directory acts as.
pub const SELF_ID: u64 = 4242;

/// A message created through the directory.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedMessage {
    pub channel_id: u64,
    pub message_id: u64,
    pub message: OutgoingMessage,
}

struct State {
    sequence: u64,
    clock: DateTime<Utc>,
    guilds: HashMap<u64, Guild>,
    channels: Vec<(u64, DirectoryChannel)>,
    messages: HashMap<u64, Vec<SourceMessage>>,
    created: Vec<CreatedMessage>,
    fetched_urls: Vec<String>,
    attachments: HashMap<String, Result<Vec<u8>, (u16, String)>>,
    page_requests: usize,
    failing_names: HashSet<String>,
    failing_listings: HashSet<u64>,
    listing_delay: Option<std::time::Duration>,
    failing_histories: HashSet<u64>,
    failing_contents: HashSet<String>,
    failing_reactions: bool,
    cancel_after_creates: Option<(usize, CancellationToken)>,
}

impl State {
    fn next_id(&mut self, at: DateTime<Utc>) -> u64 {
        self.sequence += 1;
        snowflake::from_timestamp(at) | self.sequence
    }

    /// Advances the directory clock by one minute and returns the new instant.
    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += Duration::minutes(1);
        self.clock
    }

    fn add_channel(&mut self, guild_id: u64, channel: DirectoryChannel) {
        self.channels.push((guild_id, channel));
    }

    fn find_message(&mut self, channel_id: u64, message_id: u64) -> Option<&mut SourceMessage> {
        self.messages
            .get_mut(&channel_id)
            .and_then(|messages| messages.iter_mut().find(|m| m.id == message_id))
    }
}

pub struct InMemoryDirectory {
    state: RwLock<State>,
}

fn injected(what: &str) -> AppError {
    AppError::NotFound(format!("injected failure: {}", what))
}

/// Builds an ordinary message authored by a regular account.
pub fn sample_message(
    channel_id: u64,
    id: u64,
    content: &str,
    timestamp: DateTime<Utc>,
) -> SourceMessage {
    let raw_author = RawAuthor {
        id: 1001,
        username: "alice".to_string(),
        global_name: Some("Alice".to_string()),
        avatar_url: "https://cdn.discordapp.com/embed/avatars/0.png".to_string(),
        bot: false,
        system: false,
    };

    SourceMessage {
        id,
        channel_id,
        author: Some(raw_author.to_author()),
        raw_author,
        content: content.to_string(),
        attachments: Vec::new(),
        embeds: Vec::new(),
        timestamp,
        edited_timestamp: None,
        kind: MessageKind::Default,
        reactions: Vec::new(),
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDirectory {
    /// Creates an empty directory whose clock starts at 2022-01-01.
    ///
    /// Channels are created at the clock time and every added message advances it,
    /// so message snowflakes are always later than their channel's.
    pub fn new() -> Self {
        let clock = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();

        Self {
            state: RwLock::new(State {
                sequence: 0,
                clock,
                guilds: HashMap::new(),
                channels: Vec::new(),
                messages: HashMap::new(),
                created: Vec::new(),
                fetched_urls: Vec::new(),
                attachments: HashMap::new(),
                page_requests: 0,
                failing_names: HashSet::new(),
                failing_listings: HashSet::new(),
                listing_delay: None,
                failing_histories: HashSet::new(),
                failing_contents: HashSet::new(),
                failing_reactions: false,
                cancel_after_creates: None,
            }),
        }
    }

    pub async fn add_guild(&self, name: &str) -> u64 {
        let mut state = self.state.write().await;
        let at = state.clock;
        let id = state.next_id(at);
        state.guilds.insert(
            id,
            Guild {
                id,
                name: name.to_string(),
            },
        );
        id
    }

    pub async fn add_category(&self, guild_id: u64, name: &str) -> u64 {
        let mut state = self.state.write().await;
        let at = state.clock;
        let id = state.next_id(at);
        let position = state.channels.len() as u16;
        state.add_channel(
            guild_id,
            DirectoryChannel::Category(Category {
                id,
                name: name.to_string(),
                position,
            }),
        );
        id
    }

    pub async fn add_text_channel(&self, guild_id: u64, parent_id: Option<u64>, name: &str) -> u64 {
        let mut state = self.state.write().await;
        let at = state.clock;
        let id = state.next_id(at);
        let position = state.channels.len() as u16;
        state.add_channel(
            guild_id,
            DirectoryChannel::Text(TextChannel {
                id,
                name: name.to_string(),
                topic: Some(format!("{} topic", name)),
                nsfw: false,
                position,
                parent_id,
            }),
        );
        state.messages.insert(id, Vec::new());
        id
    }

    pub async fn add_voice_channel(
        &self,
        guild_id: u64,
        parent_id: Option<u64>,
        name: &str,
    ) -> u64 {
        let mut state = self.state.write().await;
        let at = state.clock;
        let id = state.next_id(at);
        let position = state.channels.len() as u16;
        state.add_channel(
            guild_id,
            DirectoryChannel::Voice(VoiceChannel {
                id,
                name: name.to_string(),
                position,
                parent_id,
            }),
        );
        id
    }

    /// Adds an ordinary message one minute after the previous one.
    pub async fn add_message(&self, channel_id: u64, content: &str) -> u64 {
        self.add_message_with(channel_id, content, |_| {}).await
    }

    /// Adds a message one minute after the previous one, customized by `customize`.
    ///
    /// The ID and timestamp are assigned before `customize` runs and must not be
    /// changed by it.
    pub async fn add_message_with(
        &self,
        channel_id: u64,
        content: &str,
        customize: impl FnOnce(&mut SourceMessage),
    ) -> u64 {
        let mut state = self.state.write().await;
        let at = state.tick();
        let id = state.next_id(at);
        let mut message = sample_message(channel_id, id, content, at);
        customize(&mut message);
        state.messages.entry(channel_id).or_default().push(message);
        id
    }

    /// Current directory clock, the timestamp of the last added message.
    pub async fn clock(&self) -> DateTime<Utc> {
        self.state.read().await.clock
    }

    /// Registers the response served for an attachment URL.
    pub async fn serve_attachment(&self, url: &str, response: Result<Vec<u8>, (u16, &str)>) {
        self.state.write().await.attachments.insert(
            url.to_string(),
            response.map_err(|(status, body)| (status, body.to_string())),
        );
    }

    /// Makes creating any category or channel with this name fail.
    pub async fn fail_creating(&self, name: &str) {
        self.state.write().await.failing_names.insert(name.to_string());
    }

    /// Makes listing the channels of this guild fail.
    pub async fn fail_listing(&self, guild_id: u64) {
        self.state.write().await.failing_listings.insert(guild_id);
    }

    /// Delays every channel listing, widening the gap between a lookup and a create.
    pub async fn slow_listings(&self, delay: std::time::Duration) {
        self.state.write().await.listing_delay = Some(delay);
    }

    /// Makes fetching the history of this channel fail.
    pub async fn fail_history(&self, channel_id: u64) {
        self.state.write().await.failing_histories.insert(channel_id);
    }

    /// Makes creating a message fail when its descriptive text equals `content`.
    pub async fn fail_message(&self, content: &str) {
        self.state
            .write()
            .await
            .failing_contents
            .insert(content.to_string());
    }

    /// Makes adding and removing reactions fail.
    pub async fn fail_reactions(&self) {
        self.state.write().await.failing_reactions = true;
    }

    /// Cancels `token` once `count` messages have been created.
    pub async fn cancel_after_creates(&self, count: usize, token: CancellationToken) {
        self.state.write().await.cancel_after_creates = Some((count, token));
    }

    pub async fn channels_of(&self, guild_id: u64) -> Vec<DirectoryChannel> {
        self.state
            .read()
            .await
            .channels
            .iter()
            .filter(|(guild, _)| *guild == guild_id)
            .map(|(_, channel)| channel.clone())
            .collect()
    }

    /// All channels of a guild with the given name, of any kind.
    pub async fn channels_named(&self, guild_id: u64, name: &str) -> Vec<DirectoryChannel> {
        self.channels_of(guild_id)
            .await
            .into_iter()
            .filter(|channel| channel.name() == name)
            .collect()
    }

    pub async fn created_in(&self, channel_id: u64) -> Vec<OutgoingMessage> {
        self.state
            .read()
            .await
            .created
            .iter()
            .filter(|created| created.channel_id == channel_id)
            .map(|created| created.message.clone())
            .collect()
    }

    pub async fn created_count(&self) -> usize {
        self.state.read().await.created.len()
    }

    pub async fn fetched_urls(&self) -> Vec<String> {
        self.state.read().await.fetched_urls.clone()
    }

    pub async fn page_requests(&self) -> usize {
        self.state.read().await.page_requests
    }

    /// Whether the acting account's reaction `emoji` is on the message.
    pub async fn has_own_reaction(&self, channel_id: u64, message_id: u64, emoji: &str) -> bool {
        self.state
            .read()
            .await
            .messages
            .get(&channel_id)
            .and_then(|messages| messages.iter().find(|m| m.id == message_id))
            .is_some_and(|message| {
                message
                    .reactions
                    .iter()
                    .any(|reaction| reaction.emoji == emoji && reaction.me)
            })
    }

    /// Number of messages in a channel carrying the acting account's reaction `emoji`.
    pub async fn own_reaction_count(&self, channel_id: u64, emoji: &str) -> usize {
        self.state
            .read()
            .await
            .messages
            .get(&channel_id)
            .map(|messages| {
                messages
                    .iter()
                    .filter(|message| {
                        message
                            .reactions
                            .iter()
                            .any(|reaction| reaction.emoji == emoji && reaction.me)
                    })
                    .count()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl DirectoryClient for InMemoryDirectory {
    async fn current_user(&self) -> Result<Account, AppError> {
        Ok(Account {
            id: SELF_ID,
            name: "transfer-bot".to_string(),
        })
    }

    async fn get_guild(&self, guild_id: u64) -> Result<Option<Guild>, AppError> {
        Ok(self.state.read().await.guilds.get(&guild_id).cloned())
    }

    async fn get_channel(
        &self,
        guild_id: u64,
        channel_id: u64,
    ) -> Result<Option<DirectoryChannel>, AppError> {
        Ok(self
            .state
            .read()
            .await
            .channels
            .iter()
            .find(|(guild, channel)| *guild == guild_id && channel.id() == channel_id)
            .map(|(_, channel)| channel.clone()))
    }

    async fn list_channels(&self, guild_id: u64) -> Result<Vec<DirectoryChannel>, AppError> {
        let delay = {
            let state = self.state.read().await;
            if state.failing_listings.contains(&guild_id) {
                return Err(injected("list channels"));
            }
            state.listing_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(self.channels_of(guild_id).await)
    }

    async fn create_category(&self, guild_id: u64, name: &str) -> Result<Category, AppError> {
        let mut state = self.state.write().await;
        if state.failing_names.contains(name) {
            return Err(injected("create category"));
        }

        let at = state.clock;
        let category = Category {
            id: state.next_id(at),
            name: name.to_string(),
            position: state.channels.len() as u16,
        };
        state.add_channel(guild_id, DirectoryChannel::Category(category.clone()));
        Ok(category)
    }

    async fn create_text_channel(
        &self,
        guild_id: u64,
        param: CreateTextChannelParam,
    ) -> Result<TextChannel, AppError> {
        let mut state = self.state.write().await;
        if state.failing_names.contains(&param.name) {
            return Err(injected("create text channel"));
        }

        let at = state.clock;
        let channel = TextChannel {
            id: state.next_id(at),
            name: param.name,
            topic: param.topic,
            nsfw: param.nsfw,
            position: param.position,
            parent_id: param.parent_id,
        };
        state.add_channel(guild_id, DirectoryChannel::Text(channel.clone()));
        state.messages.insert(channel.id, Vec::new());
        Ok(channel)
    }

    async fn create_voice_channel(
        &self,
        guild_id: u64,
        param: CreateVoiceChannelParam,
    ) -> Result<VoiceChannel, AppError> {
        let mut state = self.state.write().await;
        if state.failing_names.contains(&param.name) {
            return Err(injected("create voice channel"));
        }

        let at = state.clock;
        let channel = VoiceChannel {
            id: state.next_id(at),
            name: param.name,
            position: param.position,
            parent_id: param.parent_id,
        };
        state.add_channel(guild_id, DirectoryChannel::Voice(channel.clone()));
        Ok(channel)
    }

    async fn messages_after(
        &self,
        channel_id: u64,
        after: u64,
        limit: u8,
    ) -> Result<Vec<SourceMessage>, AppError> {
        let mut state = self.state.write().await;
        state.page_requests += 1;
        if state.failing_histories.contains(&channel_id) {
            return Err(injected("fetch messages"));
        }

        let mut page: Vec<SourceMessage> = state
            .messages
            .get(&channel_id)
            .map(|messages| {
                messages
                    .iter()
                    .filter(|message| message.id > after)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        page.sort_by_key(|message| message.id);
        page.truncate(limit as usize);
        Ok(page)
    }

    async fn create_message(
        &self,
        channel_id: u64,
        message: OutgoingMessage,
    ) -> Result<u64, AppError> {
        let mut state = self.state.write().await;
        let text = message
            .embeds
            .first()
            .and_then(|embed| embed.description.clone())
            .unwrap_or_default();
        if state.failing_contents.contains(&text) {
            return Err(injected("create message"));
        }

        let at = state.clock;
        let message_id = state.next_id(at);
        state.created.push(CreatedMessage {
            channel_id,
            message_id,
            message,
        });

        let created = state.created.len();
        if let Some((count, token)) = &state.cancel_after_creates {
            if created >= *count {
                token.cancel();
            }
        }

        Ok(message_id)
    }

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if state.failing_reactions {
            return Err(injected("add reaction"));
        }

        let message = state
            .find_message(channel_id, message_id)
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", message_id)))?;
        match message.reactions.iter_mut().find(|r| r.emoji == emoji) {
            Some(reaction) if reaction.me => {}
            Some(reaction) => {
                reaction.me = true;
                reaction.count += 1;
            }
            None => message.reactions.push(Reaction {
                emoji: emoji.to_string(),
                count: 1,
                me: true,
            }),
        }
        Ok(())
    }

    async fn remove_own_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if state.failing_reactions {
            return Err(injected("remove reaction"));
        }

        let message = state
            .find_message(channel_id, message_id)
            .ok_or_else(|| AppError::NotFound(format!("Message {} not found", message_id)))?;
        if let Some(reaction) = message
            .reactions
            .iter_mut()
            .find(|r| r.emoji == emoji && r.me)
        {
            reaction.me = false;
            reaction.count = reaction.count.saturating_sub(1);
        }
        message.reactions.retain(|r| r.count > 0);
        Ok(())
    }

    async fn fetch_attachment(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let mut state = self.state.write().await;
        state.fetched_urls.push(url.to_string());

        match state.attachments.get(url) {
            Some(Ok(data)) => Ok(data.clone()),
            Some(Err((status, body))) => Err(AppError::AttachmentHttp {
                status: *status,
                body: body.clone(),
            }),
            None => Err(AppError::AttachmentHttp {
                status: 404,
                body: String::new(),
            }),
        }
    }
}

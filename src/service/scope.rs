//! Scope selection.
//!
//! Turns a `MigrationScope` into the concrete categories and channels of the source
//! guild a run will visit. Configured IDs that do not resolve, or resolve to the
//! wrong channel kind, are dropped with a warning rather than failing the run.

use std::collections::HashSet;

use crate::{
    data::discord::DirectoryClient,
    error::AppError,
    model::{
        discord::{Category, DirectoryChannel, TextChannel, VoiceChannel},
        scope::MigrationScope,
    },
};

/// A text or voice channel selected for processing.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedChannel {
    /// The source channel; never a category.
    pub channel: DirectoryChannel,
    /// The source parent category, when the channel has one.
    pub parent: Option<Category>,
    /// Whether the parent category is itself part of the selection.
    pub parent_selected: bool,
}

/// Categories and channels a run will visit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedScope {
    pub categories: Vec<Category>,
    pub channels: Vec<ScopedChannel>,
}

impl SelectedScope {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.channels.is_empty()
    }

    /// Text channels in scope, with their source parent.
    pub fn text_channels(&self) -> impl Iterator<Item = (&TextChannel, &ScopedChannel)> {
        self.channels
            .iter()
            .filter_map(|scoped| scoped.channel.as_text().map(|text| (text, scoped)))
    }

    /// Voice channels in scope whose parent is the given source category.
    pub fn voice_channels_of(&self, category_id: u64) -> impl Iterator<Item = &VoiceChannel> {
        self.channels
            .iter()
            .filter(move |scoped| scoped.parent_selected)
            .filter_map(|scoped| scoped.channel.as_voice())
            .filter(move |voice| voice.parent_id == Some(category_id))
    }

    /// Voice channels included explicitly, outside any selected category.
    pub fn loose_voice_channels(&self) -> impl Iterator<Item = (&VoiceChannel, &ScopedChannel)> {
        self.channels
            .iter()
            .filter(|scoped| !scoped.parent_selected)
            .filter_map(|scoped| scoped.channel.as_voice().map(|voice| (voice, scoped)))
    }
}

pub struct ScopeSelector<'a> {
    client: &'a dyn DirectoryClient,
    scope: &'a MigrationScope,
}

impl<'a> ScopeSelector<'a> {
    /// Creates a new ScopeSelector.
    ///
    /// # Arguments
    /// - `client` - Directory client used to list and resolve source channels
    /// - `scope` - The run's scope configuration
    ///
    /// # Returns
    /// - `ScopeSelector` - New selector instance
    pub fn new(client: &'a dyn DirectoryClient, scope: &'a MigrationScope) -> Self {
        Self { client, scope }
    }

    /// Selects the categories and channels of the source guild to process.
    ///
    /// Categories are the configured ones when any are given; otherwise none when
    /// channels are included explicitly; otherwise every category of the guild.
    /// Channels are the children of the selected categories plus the included
    /// channels, minus the skipped ones.
    ///
    /// # Arguments
    /// - `guild_id` - Source guild
    ///
    /// # Returns
    /// - `Ok(SelectedScope)` - The selection, possibly empty
    /// - `Err(AppError)` - Listing the source guild's channels failed
    pub async fn select(&self, guild_id: u64) -> Result<SelectedScope, AppError> {
        let listing = self.client.list_channels(guild_id).await?;

        let categories = if !self.scope.categories.is_empty() {
            self.resolve_categories(guild_id).await
        } else if !self.scope.include_channels.is_empty() {
            Vec::new()
        } else {
            listing
                .iter()
                .filter_map(DirectoryChannel::as_category)
                .cloned()
                .collect()
        };
        let selected: HashSet<u64> = categories.iter().map(|category| category.id).collect();

        let mut channels: Vec<DirectoryChannel> = listing
            .iter()
            .filter(|channel| {
                !matches!(channel, DirectoryChannel::Category(_))
                    && channel
                        .parent_id()
                        .is_some_and(|parent| selected.contains(&parent))
            })
            .cloned()
            .collect();

        for channel in self.resolve_included(guild_id).await {
            if !channels.iter().any(|c| c.id() == channel.id()) {
                channels.push(channel);
            }
        }

        channels.retain(|channel| !self.scope.is_skipped(channel.id()));
        channels.sort_by_key(|channel| match channel {
            DirectoryChannel::Text(text) => text.position,
            DirectoryChannel::Voice(voice) => voice.position,
            DirectoryChannel::Category(category) => category.position,
        });

        let channels = channels
            .into_iter()
            .map(|channel| {
                let parent = channel.parent_id().and_then(|parent_id| {
                    listing
                        .iter()
                        .filter_map(DirectoryChannel::as_category)
                        .find(|category| category.id == parent_id)
                        .cloned()
                });
                let parent_selected = parent
                    .as_ref()
                    .is_some_and(|parent| selected.contains(&parent.id));

                ScopedChannel {
                    channel,
                    parent,
                    parent_selected,
                }
            })
            .collect();

        Ok(SelectedScope {
            categories,
            channels,
        })
    }

    async fn resolve_categories(&self, guild_id: u64) -> Vec<Category> {
        let mut ids: Vec<u64> = self.scope.categories.iter().copied().collect();
        ids.sort_unstable();

        let mut categories = Vec::new();
        for id in ids {
            match self.client.get_channel(guild_id, id).await {
                Ok(Some(DirectoryChannel::Category(category))) => categories.push(category),
                Ok(_) => {
                    tracing::warn!("Category {} not found in guild {}, ignoring", id, guild_id)
                }
                Err(e) => tracing::warn!("Failed to resolve category {}: {}", id, e),
            }
        }

        categories
    }

    async fn resolve_included(&self, guild_id: u64) -> Vec<DirectoryChannel> {
        let mut ids: Vec<u64> = self.scope.include_channels.iter().copied().collect();
        ids.sort_unstable();

        let mut channels = Vec::new();
        for id in ids {
            match self.client.get_channel(guild_id, id).await {
                Ok(Some(DirectoryChannel::Category(_))) => {
                    tracing::warn!("Included channel {} is a category, ignoring", id)
                }
                Ok(Some(channel)) => channels.push(channel),
                Ok(None) => {
                    tracing::warn!("Channel {} not found in guild {}, ignoring", id, guild_id)
                }
                Err(e) => tracing::warn!("Failed to resolve channel {}: {}", id, e),
            }
        }

        channels
    }
}

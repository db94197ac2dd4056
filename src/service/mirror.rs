//! Destination structure mirroring.
//!
//! Finds the destination twin of a source category or channel by exact name,
//! creating it when none exists. Every lookup lists the destination guild again, so
//! no cache is shared between branches.

use crate::{
    data::discord::DirectoryClient,
    error::AppError,
    model::discord::{
        Category, CreateTextChannelParam, CreateVoiceChannelParam, DirectoryChannel, TextChannel,
        VoiceChannel,
    },
};

pub struct StructureMirror<'a> {
    client: &'a dyn DirectoryClient,
    guild_id: u64,
}

impl<'a> StructureMirror<'a> {
    /// Creates a new StructureMirror.
    ///
    /// # Arguments
    /// - `client` - Directory client used to list and create destination channels
    /// - `guild_id` - Destination guild
    ///
    /// # Returns
    /// - `StructureMirror` - New mirror instance
    pub fn new(client: &'a dyn DirectoryClient, guild_id: u64) -> Self {
        Self { client, guild_id }
    }

    /// Finds a destination category by exact name.
    pub async fn find_category(&self, name: &str) -> Result<Option<Category>, AppError> {
        let channels = self.client.list_channels(self.guild_id).await?;

        Ok(channels
            .iter()
            .filter_map(DirectoryChannel::as_category)
            .find(|category| category.name == name)
            .cloned())
    }

    /// Returns the destination category named like the source one, creating it if
    /// absent.
    ///
    /// # Arguments
    /// - `source` - Source category
    ///
    /// # Returns
    /// - `Ok(Category)` - Existing or newly created destination category
    /// - `Err(AppError)` - Listing or creation failed
    pub async fn find_or_create_category(&self, source: &Category) -> Result<Category, AppError> {
        if let Some(existing) = self.find_category(&source.name).await? {
            tracing::debug!("Reusing category {} ({})", existing.name, existing.id);
            return Ok(existing);
        }

        let created = self
            .client
            .create_category(self.guild_id, &source.name)
            .await?;
        tracing::info!("Created category {} ({})", created.name, created.id);

        Ok(created)
    }

    /// Returns the destination text channel named like the source one under the given
    /// parent, creating it if absent.
    ///
    /// # Arguments
    /// - `source` - Source text channel
    /// - `parent` - Destination parent category, `None` for the top level
    ///
    /// # Returns
    /// - `Ok(TextChannel)` - Existing or newly created destination channel
    /// - `Err(AppError)` - Listing or creation failed
    pub async fn find_or_create_text_channel(
        &self,
        source: &TextChannel,
        parent: Option<&Category>,
    ) -> Result<TextChannel, AppError> {
        let parent_id = parent.map(|parent| parent.id);
        let channels = self.client.list_channels(self.guild_id).await?;

        let existing = channels
            .iter()
            .filter_map(DirectoryChannel::as_text)
            .find(|channel| channel.parent_id == parent_id && channel.name == source.name);
        if let Some(existing) = existing {
            tracing::debug!("Reusing text channel #{} ({})", existing.name, existing.id);
            return Ok(existing.clone());
        }

        let created = self
            .client
            .create_text_channel(
                self.guild_id,
                CreateTextChannelParam {
                    name: source.name.clone(),
                    topic: source.topic.clone(),
                    nsfw: source.nsfw,
                    parent_id,
                    position: source.position,
                },
            )
            .await?;
        tracing::info!("Created text channel #{} ({})", created.name, created.id);

        Ok(created)
    }

    /// Mirrors a voice channel under the given parent.
    ///
    /// A voice channel with the same name already under that parent is returned
    /// untouched.
    pub async fn mirror_voice_channel(
        &self,
        source: &VoiceChannel,
        parent: Option<&Category>,
    ) -> Result<VoiceChannel, AppError> {
        let parent_id = parent.map(|parent| parent.id);
        let channels = self.client.list_channels(self.guild_id).await?;

        let existing = channels
            .iter()
            .filter_map(DirectoryChannel::as_voice)
            .find(|channel| channel.parent_id == parent_id && channel.name == source.name);
        if let Some(existing) = existing {
            return Ok(existing.clone());
        }

        let created = self
            .client
            .create_voice_channel(
                self.guild_id,
                CreateVoiceChannelParam {
                    name: source.name.clone(),
                    parent_id,
                    position: source.position,
                },
            )
            .await?;
        tracing::info!("Created voice channel {} ({})", created.name, created.id);

        Ok(created)
    }
}

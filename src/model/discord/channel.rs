//! Guild channel domain models.
//!
//! Categories, text channels and voice channels are the only channel kinds the
//! migration mirrors. Every other Discord channel type (announcement, forum, stage,
//! threads) is dropped when converting from Serenity.

use serde::Serialize;
use serenity::all::{ChannelType, GuildChannel};

use super::serialize_u64_as_string;

/// A category grouping channels within a guild.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    /// Discord channel ID of the category.
    #[serde(serialize_with = "serialize_u64_as_string")]
    pub id: u64,
    /// Category display name, used for name matching on the destination.
    pub name: String,
    /// Position in the guild's channel list.
    pub position: u16,
}

/// A text channel, which owns a message history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextChannel {
    /// Discord channel ID.
    #[serde(serialize_with = "serialize_u64_as_string")]
    pub id: u64,
    /// Channel name, used for name matching on the destination.
    pub name: String,
    /// Channel topic, if set.
    pub topic: Option<String>,
    /// Whether the channel is age-restricted.
    pub nsfw: bool,
    /// Position in the guild's channel list.
    pub position: u16,
    /// Parent category ID, if any.
    #[serde(skip)]
    pub parent_id: Option<u64>,
}

/// A voice channel, mirrored structurally only.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceChannel {
    pub id: u64,
    pub name: String,
    pub position: u16,
    pub parent_id: Option<u64>,
}

/// Closed set of channel kinds the migration understands.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryChannel {
    Category(Category),
    Text(TextChannel),
    Voice(VoiceChannel),
}

impl DirectoryChannel {
    /// Converts a Serenity guild channel at the client boundary.
    ///
    /// # Arguments
    /// - `channel` - Guild channel as returned by the Discord API
    ///
    /// # Returns
    /// - `Some(DirectoryChannel)` - For category, text and voice channels
    /// - `None` - For any other channel type
    pub fn from_serenity(channel: &GuildChannel) -> Option<Self> {
        let id = channel.id.get();
        let parent_id = channel.parent_id.map(|parent| parent.get());

        match channel.kind {
            ChannelType::Category => Some(Self::Category(Category {
                id,
                name: channel.name.clone(),
                position: channel.position,
            })),
            ChannelType::Text => Some(Self::Text(TextChannel {
                id,
                name: channel.name.clone(),
                topic: channel.topic.clone().filter(|topic| !topic.is_empty()),
                nsfw: channel.nsfw,
                position: channel.position,
                parent_id,
            })),
            ChannelType::Voice => Some(Self::Voice(VoiceChannel {
                id,
                name: channel.name.clone(),
                position: channel.position,
                parent_id,
            })),
            _ => None,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Self::Category(category) => category.id,
            Self::Text(channel) => channel.id,
            Self::Voice(channel) => channel.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Category(category) => &category.name,
            Self::Text(channel) => &channel.name,
            Self::Voice(channel) => &channel.name,
        }
    }

    /// Parent category ID; categories never have one.
    pub fn parent_id(&self) -> Option<u64> {
        match self {
            Self::Category(_) => None,
            Self::Text(channel) => channel.parent_id,
            Self::Voice(channel) => channel.parent_id,
        }
    }

    pub fn as_category(&self) -> Option<&Category> {
        match self {
            Self::Category(category) => Some(category),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextChannel> {
        match self {
            Self::Text(channel) => Some(channel),
            _ => None,
        }
    }

    pub fn as_voice(&self) -> Option<&VoiceChannel> {
        match self {
            Self::Voice(channel) => Some(channel),
            _ => None,
        }
    }
}

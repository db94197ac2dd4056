//! Discord domain models.
//!
//! Views of guilds, channels and messages as the migration needs them, converted
//! from Serenity models at the client boundary, plus the outgoing message payload
//! handed back to the client for creation. Keeping these independent from Serenity
//! lets the orchestration logic run against any `DirectoryClient`.

pub mod channel;
pub mod message;
pub mod outgoing;

use serde::Serialize;
use serenity::all::PartialGuild;

pub use channel::{Category, DirectoryChannel, TextChannel, VoiceChannel};
pub use message::{
    Author, EmbedAuthor, EmbedField, EmbedFooter, MessageKind, RawAuthor, Reaction,
    SourceAttachment, SourceEmbed, SourceMessage,
};
pub use outgoing::{
    CreateTextChannelParam, CreateVoiceChannelParam, EmbedPayload, FilePayload, OutgoingMessage,
};

/// A Discord guild (server) as seen by the migration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guild {
    /// Discord guild ID.
    #[serde(serialize_with = "serialize_u64_as_string")]
    pub id: u64,
    /// Guild display name.
    pub name: String,
}

impl Guild {
    /// Converts a Serenity guild at the client boundary.
    pub fn from_serenity(guild: &PartialGuild) -> Self {
        Self {
            id: guild.id.get(),
            name: guild.name.clone(),
        }
    }
}

/// The account the tool acts as.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: u64,
    pub name: String,
}

/// Serializes Discord IDs as strings so JSON consumers don't lose precision.
pub(crate) fn serialize_u64_as_string<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_string())
}

//! Payloads sent to the destination guild.
//!
//! These are plain data handed to a `DirectoryClient`, which turns them into the
//! Serenity builders for the actual API calls. Building them without Serenity makes
//! the content transformation inspectable in tests.

use chrono::{DateTime, Utc};

use super::message::EmbedField;

/// Parameters for creating a text channel on the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTextChannelParam {
    pub name: String,
    pub topic: Option<String>,
    pub nsfw: bool,
    /// Destination parent category, `None` for the guild top level.
    pub parent_id: Option<u64>,
    pub position: u16,
}

/// Parameters for creating a voice channel on the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateVoiceChannelParam {
    pub name: String,
    pub parent_id: Option<u64>,
    pub position: u16,
}

/// One embed of an outgoing message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedPayload {
    /// Author name, url and icon url.
    pub author: Option<(String, Option<String>, Option<String>)>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub color: Option<u32>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub fields: Vec<EmbedField>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Footer text and icon url.
    pub footer: Option<(String, Option<String>)>,
}

/// A file uploaded with an outgoing message.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePayload {
    pub filename: String,
    pub data: Vec<u8>,
}

/// A message to create on the destination.
///
/// Embeds are sent in order: descriptive embed, supplementary attachment embeds,
/// then cloned source embeds. Files are uploaded alongside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingMessage {
    pub embeds: Vec<EmbedPayload>,
    pub files: Vec<FilePayload>,
}

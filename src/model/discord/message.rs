//! Source message domain models.
//!
//! A `SourceMessage` is a read-only snapshot of one message in a source channel,
//! including the reactions needed to detect the migration marker and the raw author
//! data needed to attribute messages whose author view is absent (webhooks).

use chrono::{DateTime, Utc};
use serenity::all::{
    Attachment, Embed, Message, MessageReaction, MessageType, ReactionType, Timestamp, User,
};

/// Message kind as far as migration is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Ordinary user message.
    Default,
    /// Inline reply to another message.
    Reply,
    /// Join notices, pins, boosts and other structural notices.
    System,
    /// Kinds unknown to the client library.
    Other(u8),
}

impl MessageKind {
    /// Whether messages of this kind are replayed on the destination.
    pub fn is_replayable(self) -> bool {
        matches!(self, Self::Default | Self::Reply)
    }

    fn from_serenity(kind: MessageType) -> Self {
        match kind {
            MessageType::Regular => Self::Default,
            MessageType::InlineReply => Self::Reply,
            MessageType::Unknown(value) => Self::Other(value),
            _ => Self::System,
        }
    }
}

/// Attribution used in the descriptive embed of a migrated message.
#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: u64,
    /// Global display name if set, otherwise the username.
    pub display_name: String,
    pub avatar_url: String,
}

/// Author data as sent by Discord, present even when no author view is.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAuthor {
    pub id: u64,
    pub username: String,
    pub global_name: Option<String>,
    pub avatar_url: String,
    pub bot: bool,
    pub system: bool,
}

impl RawAuthor {
    fn from_serenity(user: &User) -> Self {
        Self {
            id: user.id.get(),
            username: user.name.clone(),
            global_name: user.global_name.clone(),
            avatar_url: user.face(),
            bot: user.bot,
            system: user.system,
        }
    }

    /// Reconstructs an author view from the raw data.
    pub fn to_author(&self) -> Author {
        Author {
            id: self.id,
            display_name: self
                .global_name
                .clone()
                .unwrap_or_else(|| self.username.clone()),
            avatar_url: self.avatar_url.clone(),
        }
    }
}

/// A reaction on a source message.
#[derive(Debug, Clone, PartialEq)]
pub struct Reaction {
    /// Unicode emoji, or `name:id` for custom emoji.
    pub emoji: String,
    pub count: u64,
    /// Whether the acting account is among the reactors.
    pub me: bool,
}

impl Reaction {
    fn from_serenity(reaction: &MessageReaction) -> Self {
        let emoji = match &reaction.reaction_type {
            ReactionType::Unicode(emoji) => emoji.to_string(),
            ReactionType::Custom { id, name, .. } => {
                format!("{}:{}", name.as_deref().unwrap_or_default(), id.get())
            }
            other => other.to_string(),
        };

        Self {
            emoji,
            count: reaction.count,
            me: reaction.me,
        }
    }
}

/// A file attached to a source message.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceAttachment {
    pub id: u64,
    pub filename: String,
    pub url: String,
    /// Present for images and videos only.
    pub width: Option<u32>,
    pub size: u32,
}

impl SourceAttachment {
    /// Whether the attachment should be rendered as an image.
    pub fn is_image(&self) -> bool {
        self.width.is_some()
    }

    fn from_serenity(attachment: &Attachment) -> Self {
        Self {
            id: attachment.id.get(),
            filename: attachment.filename.clone(),
            url: attachment.url.clone(),
            width: attachment.width,
            size: attachment.size,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedAuthor {
    /// Mandatory at the source; `None` only for malformed input.
    pub name: Option<String>,
    pub url: Option<String>,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: Option<String>,
}

/// An embed already present on a source message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceEmbed {
    pub author: Option<EmbedAuthor>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub color: Option<u32>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub fields: Vec<EmbedField>,
    pub timestamp: Option<DateTime<Utc>>,
    pub footer: Option<EmbedFooter>,
}

impl SourceEmbed {
    fn from_serenity(embed: &Embed) -> Self {
        Self {
            author: embed.author.as_ref().map(|author| EmbedAuthor {
                name: Some(author.name.clone()).filter(|name| !name.is_empty()),
                url: author.url.clone(),
                icon_url: author.icon_url.clone(),
            }),
            title: embed.title.clone(),
            url: embed.url.clone(),
            color: embed.colour.map(|colour| colour.0),
            thumbnail: embed.thumbnail.as_ref().map(|thumbnail| thumbnail.url.clone()),
            description: embed.description.clone(),
            image: embed.image.as_ref().map(|image| image.url.clone()),
            fields: embed
                .fields
                .iter()
                .map(|field| EmbedField {
                    name: field.name.clone(),
                    value: field.value.clone(),
                    inline: field.inline,
                })
                .collect(),
            timestamp: embed.timestamp.as_ref().and_then(to_datetime),
            footer: embed.footer.as_ref().map(|footer| EmbedFooter {
                text: footer.text.clone(),
                icon_url: footer.icon_url.clone(),
            }),
        }
    }
}

/// Snapshot of one message in a source channel.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMessage {
    pub id: u64,
    pub channel_id: u64,
    /// Absent for webhook messages, whose author is not a real account.
    pub author: Option<Author>,
    pub raw_author: RawAuthor,
    pub content: String,
    pub attachments: Vec<SourceAttachment>,
    pub embeds: Vec<SourceEmbed>,
    pub timestamp: DateTime<Utc>,
    pub edited_timestamp: Option<DateTime<Utc>>,
    pub kind: MessageKind,
    pub reactions: Vec<Reaction>,
}

impl SourceMessage {
    /// Converts a Serenity message at the client boundary.
    ///
    /// Webhook messages carry a placeholder user, so their author view is left empty
    /// and only the raw author data is kept.
    ///
    /// # Arguments
    /// - `message` - Message as returned by the Discord API
    ///
    /// # Returns
    /// - `SourceMessage` - Domain snapshot of the message
    pub fn from_serenity(message: &Message) -> Self {
        let raw_author = RawAuthor::from_serenity(&message.author);
        let author = match message.webhook_id {
            Some(_) => None,
            None => Some(raw_author.to_author()),
        };

        Self {
            id: message.id.get(),
            channel_id: message.channel_id.get(),
            author,
            raw_author,
            content: message.content.clone(),
            attachments: message
                .attachments
                .iter()
                .map(SourceAttachment::from_serenity)
                .collect(),
            embeds: message.embeds.iter().map(SourceEmbed::from_serenity).collect(),
            timestamp: to_datetime(&message.timestamp).unwrap_or_default(),
            edited_timestamp: message.edited_timestamp.as_ref().and_then(to_datetime),
            kind: MessageKind::from_serenity(message.kind),
            reactions: message.reactions.iter().map(Reaction::from_serenity).collect(),
        }
    }

    /// The timestamp shown on the migrated copy: last edit if any, else creation.
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        self.edited_timestamp.unwrap_or(self.timestamp)
    }

    /// Identifier used in log lines.
    pub fn log_id(&self) -> String {
        format!("{}/{}", self.channel_id, self.id)
    }
}

/// Keeps the sub-second part, which `Timestamp::unix_timestamp` drops.
fn to_datetime(timestamp: &Timestamp) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&timestamp.to_string())
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_utils::serenity::message::{
        create_test_attachment, create_test_message, create_test_reaction, TestMessage,
    };

    /// Tests converting an ordinary message with an image, a file and a reaction.
    ///
    /// Expected: author view present, attachments and self reaction preserved
    #[test]
    fn converts_regular_message() {
        let message = create_test_message(TestMessage {
            id: 1000,
            channel_id: 600,
            author_name: "alice",
            content: "hello <@&42>",
            attachments: vec![
                create_test_attachment(1, "cat.png", Some((640, 480))),
                create_test_attachment(2, "notes.pdf", None),
            ],
            reactions: vec![create_test_reaction("\u{1F504}", 1, true)],
            ..TestMessage::default()
        });

        let converted = SourceMessage::from_serenity(&message);

        assert_eq!(converted.id, 1000);
        assert_eq!(converted.channel_id, 600);
        assert_eq!(converted.kind, MessageKind::Default);
        assert_eq!(converted.content, "hello <@&42>");
        assert_eq!(converted.author.unwrap().display_name, "alice");
        assert!(converted.attachments[0].is_image());
        assert!(!converted.attachments[1].is_image());
        assert_eq!(converted.reactions[0].emoji, "\u{1F504}");
        assert!(converted.reactions[0].me);
    }

    /// Tests that webhook messages lose their author view but keep raw author data.
    #[test]
    fn drops_author_view_for_webhook_messages() {
        let message = create_test_message(TestMessage {
            author_name: "Webhook Bot",
            author_bot: true,
            webhook_id: Some(9000),
            ..TestMessage::default()
        });

        let converted = SourceMessage::from_serenity(&message);

        assert!(converted.author.is_none());
        assert!(converted.raw_author.bot);
        assert_eq!(converted.raw_author.to_author().display_name, "Webhook Bot");
    }

    /// Tests message kind mapping for replies and system notices.
    ///
    /// Expected: 19 maps to Reply, 7 (member join) maps to System
    #[test]
    fn maps_message_kinds() {
        let reply = create_test_message(TestMessage {
            kind: 19,
            ..TestMessage::default()
        });
        let join = create_test_message(TestMessage {
            kind: 7,
            ..TestMessage::default()
        });

        assert_eq!(SourceMessage::from_serenity(&reply).kind, MessageKind::Reply);
        assert_eq!(SourceMessage::from_serenity(&join).kind, MessageKind::System);
    }

    /// Tests converting a rich embed field for field.
    #[test]
    fn converts_embed() {
        let message = create_test_message(TestMessage {
            embeds: vec![json!({
                "type": "rich",
                "title": "Release",
                "url": "https://example.com/release",
                "color": 16711680,
                "description": "Notes",
                "author": { "name": "ci", "icon_url": "https://example.com/ci.png" },
                "thumbnail": { "url": "https://example.com/thumb.png" },
                "image": { "url": "https://example.com/image.png" },
                "fields": [
                    { "name": "Version", "value": "1.2", "inline": true },
                    { "name": "Status", "value": "ok", "inline": false }
                ],
                "footer": { "text": "build 7" },
                "timestamp": "2023-01-01T00:00:00+00:00"
            })],
            ..TestMessage::default()
        });

        let converted = SourceMessage::from_serenity(&message);
        let embed = &converted.embeds[0];

        assert_eq!(embed.title.as_deref(), Some("Release"));
        assert_eq!(embed.color, Some(0xFF0000));
        assert_eq!(embed.author.as_ref().unwrap().name.as_deref(), Some("ci"));
        assert_eq!(embed.thumbnail.as_deref(), Some("https://example.com/thumb.png"));
        assert_eq!(embed.fields.len(), 2);
        assert!(embed.fields[0].inline);
        assert!(!embed.fields[1].inline);
        assert_eq!(embed.footer.as_ref().unwrap().text, "build 7");
        assert!(embed.timestamp.is_some());
    }

    /// Tests the effective timestamp prefers the edit time.
    #[test]
    fn effective_timestamp_prefers_edit_time() {
        let message = create_test_message(TestMessage {
            edited_timestamp: Some("2023-02-01T00:00:00.000000+00:00"),
            ..TestMessage::default()
        });

        let converted = SourceMessage::from_serenity(&message);

        assert_eq!(
            converted.effective_timestamp(),
            converted.edited_timestamp.unwrap()
        );
        assert!(converted.effective_timestamp() > converted.timestamp);
    }

    /// Tests that message timestamps keep their milliseconds.
    ///
    /// Expected: 250 ms on the creation time, 125 ms on the edit time
    #[test]
    fn keeps_sub_second_timestamps() {
        let message = create_test_message(TestMessage {
            timestamp: "2023-01-01T00:00:00.250000+00:00",
            edited_timestamp: Some("2023-02-01T00:00:00.125000+00:00"),
            ..TestMessage::default()
        });

        let converted = SourceMessage::from_serenity(&message);

        assert_eq!(converted.timestamp.timestamp_subsec_millis(), 250);
        assert_eq!(
            converted.edited_timestamp.unwrap().timestamp_subsec_millis(),
            125
        );
    }
}

//! Test factories for creating Serenity message objects.
//!
//! Attachments, embeds and reactions are passed to `create_test_message` as raw JSON
//! values so tests can also describe shapes the helpers here don't cover.

use serde_json::{json, Value};
use serenity::all::Message;

/// Fields of a test message; everything else gets a Discord-like default.
///
/// The default is an ordinary message (type 0) from a human account, sent on
/// 2023-01-01 and never edited.
#[derive(Debug, Clone)]
pub struct TestMessage<'a> {
    pub id: u64,
    pub channel_id: u64,
    pub author_name: &'a str,
    pub author_bot: bool,
    pub content: &'a str,
    pub attachments: Vec<Value>,
    pub embeds: Vec<Value>,
    pub reactions: Vec<Value>,
    /// Discord message type number (0 default, 7 member join, 19 reply).
    pub kind: u8,
    pub webhook_id: Option<u64>,
    pub timestamp: &'a str,
    pub edited_timestamp: Option<&'a str>,
}

impl Default for TestMessage<'_> {
    fn default() -> Self {
        Self {
            id: 1_100_000_000_000_000_000,
            channel_id: 1_000_000_000_000_000_000,
            author_name: "alice",
            author_bot: false,
            content: "",
            attachments: Vec::new(),
            embeds: Vec::new(),
            reactions: Vec::new(),
            kind: 0,
            webhook_id: None,
            timestamp: "2023-01-01T00:00:00.000000+00:00",
            edited_timestamp: None,
        }
    }
}

/// Creates a test Serenity Message.
///
/// # Arguments
/// - `message` - Fields to set
///
/// # Returns
/// - `Message` - A valid Serenity Message struct for testing
///
/// # Panics
/// - If the JSON cannot be deserialized into a Message (indicates invalid test data)
pub fn create_test_message(message: TestMessage<'_>) -> Message {
    serde_json::from_value(json!({
        "id": message.id.to_string(),
        "channel_id": message.channel_id.to_string(),
        "author": {
            "id": "200000000000000000",
            "username": message.author_name,
            "discriminator": "0",
            "global_name": null,
            "avatar": null,
            "bot": message.author_bot,
            "system": false,
            "public_flags": 0,
        },
        "content": message.content,
        "timestamp": message.timestamp,
        "edited_timestamp": message.edited_timestamp,
        "tts": false,
        "mention_everyone": false,
        "mentions": [],
        "mention_roles": [],
        "attachments": message.attachments,
        "embeds": message.embeds,
        "reactions": message.reactions,
        "pinned": false,
        "webhook_id": message.webhook_id.map(|id| id.to_string()),
        "type": message.kind,
        "flags": 0,
        "components": [],
    }))
    .expect("Failed to create test message - invalid JSON structure")
}

/// Builds attachment JSON; `dimensions` is set for images only.
pub fn create_test_attachment(id: u64, filename: &str, dimensions: Option<(u32, u32)>) -> Value {
    let url = format!(
        "https://cdn.discordapp.com/attachments/1000000000000000000/{}/{}",
        id, filename
    );

    json!({
        "id": id.to_string(),
        "filename": filename,
        "size": 1024,
        "url": url,
        "proxy_url": url.replace("cdn.discordapp.com", "media.discordapp.net"),
        "width": dimensions.map(|(width, _)| width),
        "height": dimensions.map(|(_, height)| height),
        "content_type": null,
        "ephemeral": false,
    })
}

/// Builds reaction JSON for a unicode emoji.
///
/// # Arguments
/// - `emoji` - Unicode emoji
/// - `count` - Total number of accounts that reacted
/// - `me` - Whether the acting account is among them
pub fn create_test_reaction(emoji: &str, count: u64, me: bool) -> Value {
    json!({
        "count": count,
        "count_details": { "burst": 0, "normal": count },
        "me": me,
        "me_burst": false,
        "emoji": { "id": null, "name": emoji },
        "burst_colors": [],
    })
}

//! Test factories for creating Serenity guild channel objects.
//!
//! Channel types follow Discord's numbering: 0 text, 2 voice, 4 category,
//! 5 announcement, 13 stage, 15 forum.

use serenity::all::GuildChannel;

/// Creates a test Serenity GuildChannel of any type.
///
/// # Arguments
/// - `channel_id` - Discord channel ID (snowflake)
/// - `guild_id` - Owning guild ID
/// - `kind` - Discord channel type number
/// - `parent_id` - Parent category ID, if any
/// - `name` - Channel name
/// - `position` - Position in the guild's channel list
///
/// # Returns
/// - `GuildChannel` - A valid Serenity GuildChannel struct for testing
///
/// # Panics
/// - If the JSON cannot be deserialized into a GuildChannel (indicates invalid test data)
pub fn create_test_channel(
    channel_id: u64,
    guild_id: u64,
    kind: u8,
    parent_id: Option<u64>,
    name: &str,
    position: u16,
) -> GuildChannel {
    channel_json(channel_id, guild_id, kind, parent_id, name, None, false, position)
}

/// Creates a test category channel.
pub fn create_test_category(
    channel_id: u64,
    guild_id: u64,
    name: &str,
    position: u16,
) -> GuildChannel {
    channel_json(channel_id, guild_id, 4, None, name, None, false, position)
}

/// Creates a test text channel with an optional topic.
///
/// # Arguments
/// - `channel_id` - Discord channel ID (snowflake)
/// - `guild_id` - Owning guild ID
/// - `parent_id` - Parent category ID, if any
/// - `name` - Channel name
/// - `topic` - Channel topic
/// - `nsfw` - Age-restriction flag
/// - `position` - Position in the guild's channel list
///
/// # Returns
/// - `GuildChannel` - A text channel (type 0)
pub fn create_test_text_channel(
    channel_id: u64,
    guild_id: u64,
    parent_id: Option<u64>,
    name: &str,
    topic: Option<&str>,
    nsfw: bool,
    position: u16,
) -> GuildChannel {
    channel_json(channel_id, guild_id, 0, parent_id, name, topic, nsfw, position)
}

#[allow(clippy::too_many_arguments)]
fn channel_json(
    channel_id: u64,
    guild_id: u64,
    kind: u8,
    parent_id: Option<u64>,
    name: &str,
    topic: Option<&str>,
    nsfw: bool,
    position: u16,
) -> GuildChannel {
    serde_json::from_value(serde_json::json!({
        "id": channel_id.to_string(),
        "type": kind,
        "guild_id": guild_id.to_string(),
        "name": name,
        "position": position,
        "permission_overwrites": [],
        "parent_id": parent_id.map(|id| id.to_string()),
        "topic": topic,
        "nsfw": nsfw,
        "last_message_id": null,
        "rate_limit_per_user": 0,
        "flags": 0,
        "available_tags": [],
        "applied_tags": [],
    }))
    .expect("Failed to create test channel - invalid JSON structure")
}

//! Test factory for creating Serenity guild objects.

use serenity::all::PartialGuild;

/// Creates a test Serenity PartialGuild, as returned by `GET /guilds/{id}`.
///
/// # Arguments
/// - `guild_id` - Discord guild ID (snowflake)
/// - `name` - Guild name
///
/// # Returns
/// - `PartialGuild` - A valid Serenity PartialGuild struct for testing
///
/// # Panics
/// - If the JSON cannot be deserialized into a PartialGuild (indicates invalid test data)
pub fn create_test_guild(guild_id: u64, name: &str) -> PartialGuild {
    serde_json::from_value(serde_json::json!({
        "id": guild_id.to_string(),
        "name": name,
        "icon": null,
        "splash": null,
        "discovery_splash": null,
        "owner_id": "100000000000000000",
        "afk_channel_id": null,
        "afk_timeout": 300,
        "verification_level": 0,
        "default_message_notifications": 0,
        "explicit_content_filter": 0,
        "roles": [],
        "emojis": [],
        "stickers": [],
        "features": [],
        "mfa_level": 0,
        "application_id": null,
        "system_channel_id": null,
        "system_channel_flags": 0,
        "rules_channel_id": null,
        "vanity_url_code": null,
        "description": null,
        "banner": null,
        "premium_tier": 0,
        "premium_subscription_count": 0,
        "preferred_locale": "en-US",
        "public_updates_channel_id": null,
        "nsfw_level": 0,
        "premium_progress_bar_enabled": false,
    }))
    .expect("Failed to create test guild - invalid JSON structure")
}

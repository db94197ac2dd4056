//! Migration marker protocol.
//!
//! A copied source message is flagged with the acting account's own 🔄 reaction. The
//! reaction is the only record of what was migrated: the migrator skips flagged
//! messages and the cleanup run removes the flags.

use crate::{data::discord::DirectoryClient, error::AppError, model::discord::SourceMessage};

/// Reaction used as the migration marker.
pub const MIGRATED_EMOJI: &str = "\u{1F504}";

/// Whether the acting account already flagged this message as migrated.
///
/// Reactions of other accounts with the same emoji do not count.
pub fn is_migrated(message: &SourceMessage) -> bool {
    message
        .reactions
        .iter()
        .any(|reaction| reaction.me && reaction.emoji == MIGRATED_EMOJI)
}

/// Flags a source message as migrated.
pub async fn mark(client: &dyn DirectoryClient, message: &SourceMessage) -> Result<(), AppError> {
    client
        .add_reaction(message.channel_id, message.id, MIGRATED_EMOJI)
        .await
}

/// Removes the migration flag from a source message.
pub async fn unmark(client: &dyn DirectoryClient, message: &SourceMessage) -> Result<(), AppError> {
    client
        .remove_own_reaction(message.channel_id, message.id, MIGRATED_EMOJI)
        .await
}

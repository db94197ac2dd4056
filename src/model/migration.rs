//! Migration result models.
//!
//! Each text channel branch produces a `TextChannelMigrationResult`; the run
//! reduces them into a `MigrationReport` that is logged and optionally printed as
//! JSON.

use serde::Serialize;

use crate::model::discord::{Category, TextChannel};

/// Progress of one text channel through a migration run.
///
/// `Pending → Mirroring → Replaying → Done`, where `Mirroring` and `Replaying` can
/// end in `Failed` and any state can end in `Cancelled`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ChannelState {
    Pending,
    Mirroring,
    Replaying,
    Done,
    Failed(String),
    Cancelled,
}

/// Outcome of migrating one text channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextChannelMigrationResult {
    pub source: TextChannel,
    /// `None` when the destination channel could not be resolved.
    pub destination: Option<TextChannel>,
    /// Messages created on the destination during this run.
    pub message_count: u64,
    pub state: ChannelState,
}

/// Aggregate outcome of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MigrationReport {
    /// Destination categories resolved or created during the run.
    pub categories: Vec<Category>,
    pub channels: Vec<TextChannelMigrationResult>,
}

impl MigrationReport {
    /// Total messages migrated, partial counts of failed channels included.
    pub fn total_messages(&self) -> u64 {
        self.channels.iter().map(|c| c.message_count).sum()
    }

    pub fn failed_channels(&self) -> usize {
        self.channels
            .iter()
            .filter(|c| matches!(c.state, ChannelState::Failed(_)))
            .count()
    }
}

/// Aggregate outcome of a cleanup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub channels: usize,
    pub markers_removed: u64,
}

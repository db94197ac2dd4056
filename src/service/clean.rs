//! Cleanup run.
//!
//! Walks the history of every text channel in scope and removes the acting
//! account's migration markers. Nothing else is touched, so a cleaned guild can be
//! migrated again from scratch.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    data::discord::DirectoryClient,
    error::AppError,
    model::{discord::TextChannel, migration::CleanReport, scope::MigrationScope},
    service::{
        coordinator::{BranchOutcome, WorkerPool},
        marker,
        migrate::resolve_guild,
        migrator::{pause, History},
        scope::ScopeSelector,
    },
    util::snowflake,
};

pub struct CleanService {
    client: Arc<dyn DirectoryClient>,
    scope: Arc<MigrationScope>,
    pool: WorkerPool,
}

impl CleanService {
    /// Creates a new CleanService.
    ///
    /// # Arguments
    /// - `client` - Directory client shared by every branch
    /// - `scope` - Categories, skipped channels, cutoff and delay of the run
    /// - `cancel` - Run-wide cancellation token
    ///
    /// # Returns
    /// - `CleanService` - New service instance
    pub fn new(
        client: Arc<dyn DirectoryClient>,
        scope: MigrationScope,
        cancel: CancellationToken,
    ) -> Self {
        let pool = WorkerPool::new(scope.workers, cancel);

        Self {
            client,
            scope: Arc::new(scope),
            pool,
        }
    }

    /// Removes migration markers from the selected text channels of a guild.
    ///
    /// # Arguments
    /// - `guild_id` - Guild whose markers are removed
    ///
    /// # Returns
    /// - `Ok(CleanReport)` - Channels visited and markers removed
    /// - `Err(AppError::ConfigErr)` - The guild could not be resolved
    /// - `Err(AppError)` - Listing the guild failed
    pub async fn clean(&self, guild_id: u64) -> Result<CleanReport, AppError> {
        let guild = resolve_guild(self.client.as_ref(), guild_id, "server").await?;
        tracing::info!("Removing migration markers from {} ({})", guild.name, guild.id);

        let selection = ScopeSelector::new(self.client.as_ref(), &self.scope)
            .select(guild.id)
            .await?;

        let branches: Vec<_> = selection
            .text_channels()
            .map(|(text, _)| {
                let client = self.client.clone();
                let scope = self.scope.clone();
                let cancel = self.pool.cancel_token().clone();
                let channel = text.clone();

                let branch =
                    async move { clean_channel(client.as_ref(), &scope, &cancel, &channel).await };
                (text.name.clone(), branch)
            })
            .collect();
        let channels = branches.len();

        let markers_removed = self
            .pool
            .fan_out("text channel", branches)
            .await
            .into_iter()
            .filter_map(BranchOutcome::completed)
            .sum();

        let report = CleanReport {
            channels,
            markers_removed,
        };
        tracing::info!(
            "Removed {} markers across {} channels",
            report.markers_removed,
            report.channels
        );

        Ok(report)
    }
}

/// Removes the markers of one channel and returns how many were removed.
///
/// A failed page fetch ends the channel early; a failed removal is logged and the
/// walk continues.
async fn clean_channel(
    client: &dyn DirectoryClient,
    scope: &MigrationScope,
    cancel: &CancellationToken,
    channel: &TextChannel,
) -> u64 {
    let mut history = History::new(
        client,
        channel.id,
        snowflake::channel_cursor(channel.id, scope.after),
    );
    let mut removed = 0;

    loop {
        if cancel.is_cancelled() {
            return removed;
        }

        let page = match history.next_page().await {
            Ok(Some(page)) => page,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to fetch messages of #{}: {}", channel.name, e);
                break;
            }
        };

        for message in &page {
            if !pause(scope.delay, cancel).await {
                return removed;
            }
            if !message.kind.is_replayable() || !marker::is_migrated(message) {
                continue;
            }

            match marker::unmark(client, message).await {
                Ok(()) => {
                    tracing::debug!("Removed marker from message {}", message.log_id());
                    removed += 1;
                }
                Err(e) => tracing::warn!(
                    "Failed to remove marker from message {}: {}",
                    message.log_id(),
                    e
                ),
            }
        }
    }

    tracing::info!("Removed {} markers from #{}", removed, channel.name);
    removed
}

//! Message history replay.
//!
//! Streams the history of one source text channel page by page, oldest first, and
//! replays every eligible message on the destination channel: transform, create,
//! then mark the source. Replay within a channel is strictly sequential so the
//! destination keeps the source order.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{
    data::discord::{DirectoryClient, MESSAGE_PAGE_SIZE},
    error::AppError,
    model::{
        discord::{Author, SourceMessage, TextChannel},
        migration::ChannelState,
        scope::MigrationScope,
    },
    service::{marker, transform::ContentTransformer},
    util::snowflake,
};

/// Why a fetched message is or is not replayed.
#[derive(Debug, Clone, PartialEq)]
pub enum Eligibility {
    /// Replay, attributed to this author.
    Eligible(Author),
    AlreadyMigrated,
    /// System notices such as joins, pins and boosts.
    NotReplayable,
    /// Author-less message from a system account.
    SystemAuthor,
    /// Author-less message from a bot while bots are skipped.
    BotAuthor,
}

/// Decides whether a fetched message is replayed.
///
/// Messages without an author view (webhooks) are attributed from their raw author
/// data unless that data belongs to a system account, or to a bot while `skip_bots`
/// is set.
pub fn eligibility(message: &SourceMessage, skip_bots: bool) -> Eligibility {
    if marker::is_migrated(message) {
        return Eligibility::AlreadyMigrated;
    }
    if !message.kind.is_replayable() {
        return Eligibility::NotReplayable;
    }

    match &message.author {
        Some(author) => Eligibility::Eligible(author.clone()),
        None if message.raw_author.system => Eligibility::SystemAuthor,
        None if skip_bots && message.raw_author.bot => Eligibility::BotAuthor,
        None => Eligibility::Eligible(message.raw_author.to_author()),
    }
}

/// Result of replaying one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayOutcome {
    /// Messages created on the destination, including before a failure.
    pub migrated: u64,
    /// `Done`, `Failed` or `Cancelled`.
    pub state: ChannelState,
}

pub struct MessageMigrator<'a> {
    client: &'a dyn DirectoryClient,
    scope: &'a MigrationScope,
    cancel: &'a CancellationToken,
    transformer: ContentTransformer<'a>,
}

impl<'a> MessageMigrator<'a> {
    /// Creates a new MessageMigrator.
    ///
    /// # Arguments
    /// - `client` - Directory client for both guilds
    /// - `scope` - The run's scope configuration
    /// - `cancel` - Run-wide cancellation token
    ///
    /// # Returns
    /// - `MessageMigrator` - New migrator instance
    pub fn new(
        client: &'a dyn DirectoryClient,
        scope: &'a MigrationScope,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            client,
            scope,
            cancel,
            transformer: ContentTransformer::new(client, scope.reupload_attachments),
        }
    }

    /// Replays the history of `source` onto `destination`.
    ///
    /// Fetching starts after the channel cursor (its own ID, or the cutoff when that
    /// is later) and stops at the first short page. A failed page fetch ends the
    /// replay as `Failed`; a failed message is logged and skipped.
    ///
    /// # Arguments
    /// - `source` - Source text channel
    /// - `destination` - Destination twin of the source channel
    ///
    /// # Returns
    /// - `ReplayOutcome` - Count of created messages and the final channel state
    pub async fn migrate_channel(
        &self,
        source: &TextChannel,
        destination: &TextChannel,
    ) -> ReplayOutcome {
        let mut history = History::new(
            self.client,
            source.id,
            snowflake::channel_cursor(source.id, self.scope.after),
        );
        let mut migrated = 0;

        loop {
            if self.cancel.is_cancelled() {
                return ReplayOutcome {
                    migrated,
                    state: ChannelState::Cancelled,
                };
            }

            let page = match history.next_page().await {
                Ok(Some(page)) => page,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Failed to fetch messages of #{}: {}", source.name, e);
                    return ReplayOutcome {
                        migrated,
                        state: ChannelState::Failed(e.to_string()),
                    };
                }
            };

            for message in &page {
                if !pause(self.scope.delay, self.cancel).await {
                    return ReplayOutcome {
                        migrated,
                        state: ChannelState::Cancelled,
                    };
                }

                match eligibility(message, self.scope.skip_bots) {
                    Eligibility::Eligible(author) => {
                        if self.replay(message, &author, destination).await {
                            migrated += 1;
                        }
                    }
                    skipped => {
                        tracing::debug!("Skipping message {}: {:?}", message.log_id(), skipped)
                    }
                }
            }
        }

        ReplayOutcome {
            migrated,
            state: ChannelState::Done,
        }
    }

    /// Creates one message on the destination, then marks the source.
    ///
    /// Returns true once the destination copy exists, whether or not the marker
    /// could be added.
    async fn replay(
        &self,
        message: &SourceMessage,
        author: &Author,
        destination: &TextChannel,
    ) -> bool {
        tracing::info!(
            "Migrating message ({}): {} at {}",
            message.log_id(),
            author.display_name,
            message.timestamp
        );
        tracing::trace!("Raw message:\n\t{}", message.content.replace('\n', "\n\t"));

        let outgoing = match self.transformer.transform(message, author).await {
            Ok(outgoing) => outgoing,
            Err(e) => {
                tracing::warn!("Skipping message {}: {}", message.log_id(), e);
                return false;
            }
        };

        if let Err(e) = self.client.create_message(destination.id, outgoing).await {
            tracing::warn!("Failed to create copy of message {}: {}", message.log_id(), e);
            return false;
        }

        if let Err(e) = marker::mark(self.client, message).await {
            tracing::warn!(
                "Message {} was copied but could not be marked: {}",
                message.log_id(),
                e
            );
        }

        true
    }
}

/// Ascending page-by-page walk through a channel's history.
///
/// The cursor advances to the newest ID of each page; a short page ends the walk.
pub(crate) struct History<'a> {
    client: &'a dyn DirectoryClient,
    channel_id: u64,
    cursor: u64,
    exhausted: bool,
}

impl<'a> History<'a> {
    pub(crate) fn new(client: &'a dyn DirectoryClient, channel_id: u64, cursor: u64) -> Self {
        Self {
            client,
            channel_id,
            cursor,
            exhausted: false,
        }
    }

    /// Fetches the next page, `None` once the history is exhausted.
    pub(crate) async fn next_page(&mut self) -> Result<Option<Vec<SourceMessage>>, AppError> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self
            .client
            .messages_after(self.channel_id, self.cursor, MESSAGE_PAGE_SIZE)
            .await?;
        self.exhausted = page.len() < MESSAGE_PAGE_SIZE as usize;
        if let Some(last) = page.iter().map(|message| message.id).max() {
            self.cursor = self.cursor.max(last);
        }

        if page.is_empty() {
            Ok(None)
        } else {
            Ok(Some(page))
        }
    }
}

/// Waits out the per-message delay.
///
/// Returns false when the run was cancelled before or during the wait.
pub(crate) async fn pause(delay: Duration, cancel: &CancellationToken) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

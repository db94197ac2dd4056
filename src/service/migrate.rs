//! Migration run.
//!
//! Resolves both guilds, selects the source scope and fans the work out in two
//! phases on the worker pool. The first phase mirrors categories (and their voice
//! channels); the second mirrors each text channel and replays its history. Phases
//! run one after the other so every text channel branch finds its destination
//! category already in place.

use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    data::discord::DirectoryClient,
    error::{config::ConfigError, AppError},
    model::{
        discord::{Category, Guild, TextChannel, VoiceChannel},
        migration::{ChannelState, MigrationReport, TextChannelMigrationResult},
        scope::MigrationScope,
    },
    service::{
        coordinator::{BranchOutcome, WorkerPool},
        migrator::MessageMigrator,
        mirror::StructureMirror,
        scope::{ScopeSelector, SelectedScope},
    },
};

/// Resolves a guild given on the command line.
///
/// # Arguments
/// - `client` - Directory client
/// - `guild_id` - Guild ID to resolve
/// - `role` - "source", "destination" or "server", for the error message
///
/// # Returns
/// - `Ok(Guild)` - The guild
/// - `Err(AppError::ConfigErr(ConfigError::UnknownGuild))` - No such guild is visible
pub async fn resolve_guild(
    client: &dyn DirectoryClient,
    guild_id: u64,
    role: &'static str,
) -> Result<Guild, AppError> {
    client
        .get_guild(guild_id)
        .await?
        .ok_or_else(|| ConfigError::UnknownGuild { role, guild_id }.into())
}

fn enter(channel: &TextChannel, state: &ChannelState) {
    tracing::debug!("#{} ({}) -> {:?}", channel.name, channel.id, state);
}

pub struct MigrationService {
    client: Arc<dyn DirectoryClient>,
    scope: Arc<MigrationScope>,
    pool: WorkerPool,
}

impl MigrationService {
    /// Creates a new MigrationService.
    ///
    /// # Arguments
    /// - `client` - Directory client shared by every branch
    /// - `scope` - The run's scope configuration
    /// - `cancel` - Run-wide cancellation token
    ///
    /// # Returns
    /// - `MigrationService` - New service instance
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

    /// Migrates the selected part of the source guild into the destination guild.
    ///
    /// Only guild resolution and source listing can fail the run. Branch failures are
    /// logged and reported per channel.
    ///
    /// # Arguments
    /// - `source_id` - Source guild
    /// - `destination_id` - Destination guild
    ///
    /// # Returns
    /// - `Ok(MigrationReport)` - Per-channel results, possibly partial
    /// - `Err(AppError::ConfigErr)` - A guild could not be resolved
    /// - `Err(AppError)` - Listing the source guild failed
    pub async fn migrate(
        &self,
        source_id: u64,
        destination_id: u64,
    ) -> Result<MigrationReport, AppError> {
        let source = resolve_guild(self.client.as_ref(), source_id, "source").await?;
        let destination =
            resolve_guild(self.client.as_ref(), destination_id, "destination").await?;
        tracing::info!(
            "Migrating {} ({}) to {} ({})",
            source.name,
            source.id,
            destination.name,
            destination.id
        );

        let selection = ScopeSelector::new(self.client.as_ref(), &self.scope)
            .select(source.id)
            .await?;
        if selection.is_empty() {
            tracing::warn!("Nothing to migrate in the selected scope");
            return Ok(MigrationReport::default());
        }

        let categories = self.mirror_categories(&selection, destination.id).await;
        if !self.scope.text_only {
            self.mirror_loose_voice_channels(&selection, destination.id).await;
        }
        let channels = self.migrate_text_channels(&selection, destination.id).await;

        let report = MigrationReport {
            categories,
            channels,
        };
        tracing::info!(
            "Migrated {} messages across {} channels ({} failed)",
            report.total_messages(),
            report.channels.len(),
            report.failed_channels()
        );

        Ok(report)
    }

    /// First phase: one branch per distinct category name.
    async fn mirror_categories(
        &self,
        selection: &SelectedScope,
        destination_id: u64,
    ) -> Vec<Category> {
        let mut seen = HashSet::new();
        let branches = selection
            .categories
            .iter()
            .filter(|category| seen.insert(category.name.clone()))
            .map(|category| {
                let voices: Vec<VoiceChannel> = if self.scope.text_only {
                    Vec::new()
                } else {
                    selection
                        .categories
                        .iter()
                        .filter(|same| same.name == category.name)
                        .flat_map(|same| selection.voice_channels_of(same.id))
                        .cloned()
                        .collect()
                };
                let client = self.client.clone();
                let cancel = self.pool.cancel_token().clone();
                let source = category.clone();

                let branch = async move {
                    let mirror = StructureMirror::new(client.as_ref(), destination_id);
                    let category = match mirror.find_or_create_category(&source).await {
                        Ok(category) => category,
                        Err(e) => {
                            tracing::warn!("Failed to mirror category {}: {}", source.name, e);
                            return None;
                        }
                    };

                    for voice in &voices {
                        if cancel.is_cancelled() {
                            break;
                        }
                        if let Err(e) = mirror.mirror_voice_channel(voice, Some(&category)).await {
                            tracing::warn!("Failed to mirror voice channel {}: {}", voice.name, e);
                        }
                    }

                    Some(category)
                };
                (category.name.clone(), branch)
            })
            .collect();

        self.pool
            .fan_out("category", branches)
            .await
            .into_iter()
            .filter_map(BranchOutcome::completed)
            .flatten()
            .collect()
    }

    /// Voice channels included explicitly, outside any selected category.
    async fn mirror_loose_voice_channels(&self, selection: &SelectedScope, destination_id: u64) {
        let branches: Vec<_> = selection
            .loose_voice_channels()
            .map(|(voice, scoped)| {
                let client = self.client.clone();
                let voice = voice.clone();
                let parent_name = scoped.parent.as_ref().map(|parent| parent.name.clone());
                let name = voice.name.clone();

                let branch = async move {
                    let mirror = StructureMirror::new(client.as_ref(), destination_id);
                    let parent = match parent_name {
                        Some(name) => mirror.find_category(&name).await?,
                        None => None,
                    };
                    mirror.mirror_voice_channel(&voice, parent.as_ref()).await
                };
                (name, branch)
            })
            .collect();

        let names: Vec<String> = branches.iter().map(|(name, _)| name.clone()).collect();
        let outcomes = self.pool.fan_out("voice channel", branches).await;
        for (name, outcome) in names.iter().zip(outcomes) {
            if let BranchOutcome::Completed(Err(e)) = outcome {
                tracing::warn!("Failed to mirror voice channel {}: {}", name, e);
            }
        }
    }

    /// Second phase: text channels.
    ///
    /// Destination channels are resolved one source at a time before anything fans
    /// out, so sources that land on the same destination (same name under the same
    /// destination parent) share a single channel. Then one branch per destination
    /// channel replays its sources in selection order.
    async fn migrate_text_channels(
        &self,
        selection: &SelectedScope,
        destination_id: u64,
    ) -> Vec<TextChannelMigrationResult> {
        let cancel = self.pool.cancel_token().clone();
        let mirror = StructureMirror::new(self.client.as_ref(), destination_id);
        let mut results: Vec<TextChannelMigrationResult> = Vec::new();
        let mut groups: Vec<(TextChannel, Vec<usize>)> = Vec::new();

        for (text, scoped) in selection.text_channels() {
            let mut result = TextChannelMigrationResult {
                source: text.clone(),
                destination: None,
                message_count: 0,
                state: ChannelState::Pending,
            };
            if cancel.is_cancelled() {
                result.state = ChannelState::Cancelled;
                enter(&result.source, &result.state);
                results.push(result);
                continue;
            }

            result.state = ChannelState::Mirroring;
            enter(&result.source, &result.state);
            let parent_name = scoped.parent.as_ref().map(|parent| parent.name.as_str());
            match mirror_text_channel(&mirror, text, parent_name, scoped.parent_selected).await {
                Ok(destination) => {
                    let index = results.len();
                    match groups.iter_mut().find(|(known, _)| known.id == destination.id) {
                        Some((_, members)) => members.push(index),
                        None => groups.push((destination.clone(), vec![index])),
                    }
                    result.destination = Some(destination);
                }
                Err(reason) => {
                    tracing::warn!("Failed to migrate #{}: {}", text.name, reason);
                    result.state = ChannelState::Failed(reason);
                    enter(&result.source, &result.state);
                }
            }
            results.push(result);
        }

        let branches = groups
            .iter()
            .map(|(destination, members)| {
                let client = self.client.clone();
                let scope = self.scope.clone();
                let cancel = cancel.clone();
                let destination = destination.clone();
                let name = destination.name.clone();
                let pending: Vec<TextChannelMigrationResult> =
                    members.iter().map(|&index| results[index].clone()).collect();

                let branch = async move {
                    replay_text_channels(client.as_ref(), &scope, &cancel, &destination, pending)
                        .await
                };
                (name, branch)
            })
            .collect();

        let outcomes = self.pool.fan_out("text channel", branches).await;

        for ((_, members), outcome) in groups.iter().zip(outcomes) {
            match outcome {
                BranchOutcome::Completed(replayed) => {
                    for (&index, result) in members.iter().zip(replayed) {
                        results[index] = result;
                    }
                }
                BranchOutcome::Panicked => {
                    for &index in members {
                        results[index].state = ChannelState::Failed("branch panicked".to_string());
                    }
                }
                BranchOutcome::Skipped => {
                    for &index in members {
                        results[index].state = ChannelState::Cancelled;
                    }
                }
            }
        }

        results
    }
}

/// Finds or creates the destination of one source text channel.
///
/// The destination parent is the destination category named like the source
/// parent. When the source parent was selected, that category must exist after the
/// first phase; otherwise the channel goes to the top level when none exists.
///
/// # Returns
/// - `Ok(TextChannel)` - The destination channel
/// - `Err(String)` - Why the channel could not be mirrored
async fn mirror_text_channel(
    mirror: &StructureMirror<'_>,
    source: &TextChannel,
    parent_name: Option<&str>,
    parent_selected: bool,
) -> Result<TextChannel, String> {
    let parent = match parent_name {
        Some(name) => match mirror.find_category(name).await {
            Ok(Some(category)) => Some(category),
            Ok(None) if parent_selected => {
                return Err(format!("destination category {} is missing", name));
            }
            Ok(None) => None,
            Err(e) => return Err(e.to_string()),
        },
        None => None,
    };

    mirror
        .find_or_create_text_channel(source, parent.as_ref())
        .await
        .map_err(|e| e.to_string())
}

/// Replays the history of every source sharing one destination channel, in order.
async fn replay_text_channels(
    client: &dyn DirectoryClient,
    scope: &MigrationScope,
    cancel: &CancellationToken,
    destination: &TextChannel,
    mut pending: Vec<TextChannelMigrationResult>,
) -> Vec<TextChannelMigrationResult> {
    for result in &mut pending {
        if cancel.is_cancelled() {
            result.state = ChannelState::Cancelled;
            enter(&result.source, &result.state);
            continue;
        }

        result.state = ChannelState::Replaying;
        enter(&result.source, &result.state);
        let outcome = MessageMigrator::new(client, scope, cancel)
            .migrate_channel(&result.source, destination)
            .await;

        tracing::info!(
            "Migrated {} messages from #{} to #{} ({})",
            outcome.migrated,
            result.source.name,
            destination.name,
            destination.id
        );
        result.message_count = outcome.migrated;
        result.state = outcome.state;
        enter(&result.source, &result.state);
    }

    pending
}

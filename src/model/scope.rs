//! Migration scope configuration.
//!
//! A `MigrationScope` is the single immutable value describing what a run should
//! touch and how. It is built once per invocation, from the command line or from a
//! test, and shared read-only by every branch of the run.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::time::Duration;

/// Immutable description of what a migration or cleanup run covers.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationScope {
    /// Explicit category IDs; empty means "not restricted by category".
    pub categories: HashSet<u64>,
    /// Channels never processed, even when inside a selected category.
    pub skip_channels: HashSet<u64>,
    /// Channels processed even when their category is not selected.
    pub include_channels: HashSet<u64>,
    /// Only messages created strictly after this instant are processed.
    pub after: Option<DateTime<Utc>>,
    /// Pause applied before each fetched message.
    pub delay: Duration,
    /// Skip author-less messages whose raw author is a bot.
    pub skip_bots: bool,
    /// Download attachments and upload them again instead of linking them.
    pub reupload_attachments: bool,
    /// Do not mirror voice channels.
    pub text_only: bool,
    /// Maximum number of branches running at once.
    pub workers: usize,
}

impl MigrationScope {
    pub fn builder() -> MigrationScopeBuilder {
        MigrationScopeBuilder::default()
    }

    pub fn is_skipped(&self, channel_id: u64) -> bool {
        self.skip_channels.contains(&channel_id)
    }
}

impl Default for MigrationScope {
    fn default() -> Self {
        MigrationScopeBuilder::default().build()
    }
}

/// Builder for `MigrationScope`.
///
/// Defaults match a plain `migrate` invocation: everything in scope, no delay,
/// attachments re-uploaded, voice channels mirrored, one worker per available core.
#[derive(Debug, Clone)]
pub struct MigrationScopeBuilder {
    categories: HashSet<u64>,
    skip_channels: HashSet<u64>,
    include_channels: HashSet<u64>,
    after: Option<DateTime<Utc>>,
    delay: Duration,
    skip_bots: bool,
    reupload_attachments: bool,
    text_only: bool,
    workers: Option<usize>,
}

impl Default for MigrationScopeBuilder {
    fn default() -> Self {
        Self {
            categories: HashSet::new(),
            skip_channels: HashSet::new(),
            include_channels: HashSet::new(),
            after: None,
            delay: Duration::ZERO,
            skip_bots: false,
            reupload_attachments: true,
            text_only: false,
            workers: None,
        }
    }
}

impl MigrationScopeBuilder {
    pub fn categories(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.categories.extend(ids);
        self
    }

    pub fn skip_channels(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.skip_channels.extend(ids);
        self
    }

    pub fn include_channels(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.include_channels.extend(ids);
        self
    }

    pub fn after(mut self, after: Option<DateTime<Utc>>) -> Self {
        self.after = after;
        self
    }

    /// Sets the pause applied before each fetched message, in milliseconds.
    pub fn delay_ms(mut self, delay: u64) -> Self {
        self.delay = Duration::from_millis(delay);
        self
    }

    pub fn skip_bots(mut self, skip_bots: bool) -> Self {
        self.skip_bots = skip_bots;
        self
    }

    pub fn reupload_attachments(mut self, reupload: bool) -> Self {
        self.reupload_attachments = reupload;
        self
    }

    pub fn text_only(mut self, text_only: bool) -> Self {
        self.text_only = text_only;
        self
    }

    /// Bounds concurrent branches; zero is treated as one.
    pub fn workers(mut self, workers: Option<usize>) -> Self {
        self.workers = workers;
        self
    }

    pub fn build(self) -> MigrationScope {
        let workers = self
            .workers
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4)
            })
            .max(1);

        MigrationScope {
            categories: self.categories,
            skip_channels: self.skip_channels,
            include_channels: self.include_channels,
            after: self.after,
            delay: self.delay,
            skip_bots: self.skip_bots,
            reupload_attachments: self.reupload_attachments,
            text_only: self.text_only,
            workers,
        }
    }
}

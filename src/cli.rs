//! Command line interface.
//!
//! Arguments are parsed by clap as plain strings and validated when converted into a
//! `MigrationScope`, so malformed IDs and timestamps surface as `ConfigError`s like
//! every other configuration problem.

use clap::{Args, Parser, Subcommand};

use crate::{
    error::config::ConfigError,
    model::scope::{MigrationScope, MigrationScopeBuilder},
    util::parse::{parse_instant, parse_snowflake},
};

#[derive(Parser, Debug)]
#[command(name = "guild-transfer")]
#[command(about = "Mirror a Discord guild's channels and message history into another guild")]
#[command(version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Copy categories, channels and messages from one guild to another
    Migrate {
        /// Source guild ID
        source: String,

        /// Destination guild ID
        destination: String,

        #[command(flatten)]
        filter: ChannelFilter,

        /// Channel to migrate even when its category is not selected
        #[arg(short, long = "include-channel", value_name = "ID")]
        include_channels: Vec<String>,

        /// Skip author-less messages sent by bots
        #[arg(long)]
        no_bot: bool,

        /// Link attachments instead of uploading them again
        #[arg(long)]
        no_reupload: bool,

        /// Do not mirror voice channels
        #[arg(long)]
        text_only: bool,

        /// Print the migration report as JSON on stdout
        #[arg(long)]
        output_json: bool,
    },

    /// Remove migration markers from a guild's messages
    Clean {
        /// Guild ID whose markers are removed
        server: String,

        #[command(flatten)]
        filter: ChannelFilter,
    },
}

/// Options shared by both commands.
#[derive(Args, Debug)]
pub struct ChannelFilter {
    /// Category to process; repeat for several, omit for all
    #[arg(short, long = "category", value_name = "ID")]
    pub categories: Vec<String>,

    /// Channel to leave alone
    #[arg(short, long = "skip-channel", value_name = "ID")]
    pub skip_channels: Vec<String>,

    /// Only process messages created after this RFC 3339 instant
    #[arg(short, long, value_name = "RFC3339")]
    pub after: Option<String>,

    /// Pause before each message, in milliseconds
    #[arg(short, long, value_name = "MS", default_value_t = 0)]
    pub delay: u64,

    /// Maximum number of channels processed at once
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,
}

fn parse_ids(values: &[String]) -> Result<Vec<u64>, ConfigError> {
    values.iter().map(|value| parse_snowflake(value)).collect()
}

impl ChannelFilter {
    fn into_builder(self) -> Result<MigrationScopeBuilder, ConfigError> {
        let after = self.after.as_deref().map(parse_instant).transpose()?;

        Ok(MigrationScope::builder()
            .categories(parse_ids(&self.categories)?)
            .skip_channels(parse_ids(&self.skip_channels)?)
            .after(after)
            .delay_ms(self.delay)
            .workers(self.workers))
    }
}

/// A validated `migrate` invocation.
#[derive(Debug)]
pub struct MigrateRequest {
    pub source: u64,
    pub destination: u64,
    pub scope: MigrationScope,
    pub output_json: bool,
}

/// A validated `clean` invocation.
#[derive(Debug)]
pub struct CleanRequest {
    pub server: u64,
    pub scope: MigrationScope,
}

/// A validated command.
#[derive(Debug)]
pub enum Request {
    Migrate(MigrateRequest),
    Clean(CleanRequest),
}

impl Command {
    /// Validates the raw arguments.
    ///
    /// # Returns
    /// - `Ok(Request)` - IDs and timestamps parsed, scope built
    /// - `Err(ConfigError::InvalidId)` - An ID is not a non-zero unsigned integer
    /// - `Err(ConfigError::InvalidTimestamp)` - `--after` is not an RFC 3339 instant
    pub fn into_request(self) -> Result<Request, ConfigError> {
        match self {
            Command::Migrate {
                source,
                destination,
                filter,
                include_channels,
                no_bot,
                no_reupload,
                text_only,
                output_json,
            } => {
                let source = parse_snowflake(&source)?;
                let destination = parse_snowflake(&destination)?;
                let scope = filter
                    .into_builder()?
                    .include_channels(parse_ids(&include_channels)?)
                    .skip_bots(no_bot)
                    .reupload_attachments(!no_reupload)
                    .text_only(text_only)
                    .build();

                Ok(Request::Migrate(MigrateRequest {
                    source,
                    destination,
                    scope,
                    output_json,
                }))
            }
            Command::Clean { server, filter } => Ok(Request::Clean(CleanRequest {
                server: parse_snowflake(&server)?,
                scope: filter.into_builder()?.build(),
            })),
        }
    }
}

impl Cli {
    /// Default log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }

        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

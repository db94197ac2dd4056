//! Domain models and operation-specific parameter types.
//!
//! - `discord` - Guild, channel and message views plus outgoing payloads
//! - `scope` - The immutable `MigrationScope` shared by a run
//! - `migration` - Per-channel results and run reports

pub mod discord;
pub mod migration;
pub mod scope;

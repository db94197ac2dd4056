//! Service layer for the migration and cleanup runs.
//!
//! Services sit between the command line and the `DirectoryClient`, and work with
//! domain models only:
//!
//! - **Selection**: `scope` decides which categories and channels a run touches
//! - **Mirroring**: `mirror` finds or creates destination twins by name
//! - **Replay**: `migrator` streams a channel's history through `transform`
//! - **Bookkeeping**: `marker` flags copied source messages
//! - **Orchestration**: `coordinator` runs branches on a bounded pool, driven by the
//!   `migrate` and `clean` entry points

pub mod clean;
pub mod coordinator;
pub mod marker;
pub mod migrate;
pub mod migrator;
pub mod mirror;
pub mod scope;
pub mod transform;

#[cfg(test)]
mod test;

//! Mirrors a Discord guild's categories, text and voice channels, and message history
//! into another guild.
//!
//! Copied source messages are flagged with a reaction of the acting account, which
//! makes re-runs incremental: a message carrying the marker is never copied twice.
//! The `clean` command removes those markers again.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod service;
pub mod startup;
pub mod util;

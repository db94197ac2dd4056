//! Test factories for creating Serenity API objects.
//!
//! These factories create valid Serenity structs by deserializing JSON shaped like
//! Discord's API responses, so conversions from Serenity models can be tested
//! without a network connection.
//!
//! # Available Factories
//!
//! - `guild::create_test_guild` - Create Serenity PartialGuild objects
//! - `channel::create_test_category` - Create category channels
//! - `channel::create_test_text_channel` - Create text channels with topic and flags
//! - `channel::create_test_channel` - Create a channel of any type
//! - `message::create_test_message` - Create messages from a `TestMessage`
//! - `message::create_test_attachment` - Build attachment JSON
//! - `message::create_test_reaction` - Build reaction JSON

pub mod channel;
pub mod guild;
pub mod message;

pub use channel::{create_test_category, create_test_channel, create_test_text_channel};
pub use guild::create_test_guild;
pub use message::{create_test_message, TestMessage};

//! Guild Transfer Test Utils
//!
//! Shared testing utilities for the guild transfer tool. The migration logic itself
//! is tested against an in-memory directory inside the main crate; this crate covers
//! the other side of the client boundary by producing the Serenity models the
//! Discord API would return.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::serenity::message::{create_test_message, TestMessage};
//!
//! #[test]
//! fn converts_message() {
//!     let message = create_test_message(TestMessage {
//!         content: "hello",
//!         ..TestMessage::default()
//!     });
//!
//!     // Convert and assert...
//! }
//! ```

pub mod serenity;

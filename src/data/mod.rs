//! Remote data access.
//!
//! Unlike a database-backed repository layer, the migration's only store is the
//! Discord API itself. This module holds the client abstraction and its
//! implementations, converting Serenity models to domain models at the boundary.

pub mod discord;

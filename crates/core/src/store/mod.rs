//! SQLite-backed versioned cache store.
//!
//! This module provides the persistent key-response store behind the agent,
//! using SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Versioned namespaces, one per app version, deleted as a unit
//! - Content-addressed entry keys (method + URL, SHA-256)
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod key;
pub mod migrations;
pub mod namespaces;

pub use crate::Error;

pub use connection::CacheStore;
pub use entries::StoredResponse;
pub use key::entry_key;

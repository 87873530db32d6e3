//! The offline cache agent.
//!
//! This crate ties the store and the network client together into the
//! agent proper: a small state machine driven by three host-dispatched
//! lifecycle events.
//!
//! - **install** — pre-cache the app-shell manifest into the current
//!   versioned namespace
//! - **activate** — purge namespaces of superseded versions and take
//!   control of clients
//! - **fetch** — answer intercepted GET requests cache-first, falling back
//!   to the network and opportunistically persisting good same-origin
//!   responses

pub mod agent;
pub mod lifecycle;
pub mod manifest;
pub mod network;

pub use agent::OfflineCacheAgent;
pub use lifecycle::{Lifecycle, LifecycleEvent, LifecycleState};
pub use manifest::AssetManifest;
pub use network::{FetchOutcome, FetchRequest, Network};

//! Client code for shellcache.
//!
//! This crate provides the network side of the agent: an HTTP fetch client,
//! manifest path resolution against the app origin, and classification of
//! responses as basic (same-origin) or cross-origin.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, FetchResponse, ResponseKind};
pub use fetch::url::{resolve, same_origin};

pub use reqwest::{Method, StatusCode};
pub use url::Url;

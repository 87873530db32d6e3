//! shellcache entry point.
//!
//! Warms the app-shell cache (install + activate) and then answers one
//! fetch per path given on the command line. Logging goes to stderr.

use anyhow::Result;
use shellcache_agent::{FetchOutcome, FetchRequest, OfflineCacheAgent};
use shellcache_client::{FetchClient, FetchConfig, Url, resolve};
use shellcache_core::{AppConfig, CacheStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(namespace = %config.namespace(), origin = %config.origin, "starting shellcache agent");

    let store = CacheStore::open(&config.db_path).await?;
    let client = FetchClient::new(FetchConfig::from_app(&config))?;
    let mut agent = OfflineCacheAgent::new(store.clone(), client, &config)?;

    agent.handle_install().await?;
    agent.handle_activate().await?;

    let entries = store.count_entries(agent.namespace()).await?;
    tracing::info!(namespace = %agent.namespace(), entries, "agent active");

    let origin = Url::parse(&config.origin)?;
    for path in std::env::args().skip(1) {
        let url = resolve(&origin, &path)?;
        match agent.handle_fetch(&FetchRequest::get(url)).await? {
            FetchOutcome::Hit(entry) => {
                println!("{path}: cached ({} bytes, status {})", entry.body.len(), entry.status);
            }
            FetchOutcome::Network(response) => {
                println!("{path}: network ({} bytes, status {})", response.bytes.len(), response.status.as_u16());
            }
            FetchOutcome::Unavailable => println!("{path}: unavailable"),
            FetchOutcome::PassThrough => println!("{path}: pass-through"),
        }
    }

    Ok(())
}

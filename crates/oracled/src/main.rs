//! oracled - office-hours request routing daemon.
//!
//! Routes student help requests to the best-available staff helper through
//! a three-stage generation pipeline and keeps an in-memory knowledge base
//! of resolved cases.

use anyhow::Result;
use oracled::config::Config;
use oracled::gateway::Gateway;
use oracled::notifier::QueueNotifier;
use oracled::pipeline::Pipeline;
use oracled::{seed, server, store};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("oracled v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();
    if !config.llm.enabled {
        info!("Generation backend disabled - every stage will use its deterministic fallback");
    }

    let gateway = Arc::new(Gateway::new(config.llm.clone())?);
    let store = store::create_shared_store();
    if config.seed_demo_data {
        let mut store = store.write().await;
        seed::seed_demo_data(&mut store);
    }
    let notifier = Arc::new(QueueNotifier::new());
    let pipeline = Pipeline::new(gateway, store, notifier);

    server::run(&config.server, pipeline).await
}

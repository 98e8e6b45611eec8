use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use event_deletes::cascade::CascadeEngine;
use event_deletes::config::Config;
use event_deletes::dispatch::Dispatcher;
use event_deletes::gateway;
use event_deletes::store::{MemoryStore, StoreSnapshot};
use event_deletes::types::DeleteRequest;

/// Reads one deletion request from stdin, runs it against an in-memory store
/// seeded from the optional snapshot argument, and prints the response.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "event_deletes=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();

    let snapshot = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => StoreSnapshot::load(&path)
            .await
            .with_context(|| format!("loading snapshot {}", path.display()))?,
        None => StoreSnapshot::default(),
    };
    let store = Arc::new(MemoryStore::from_snapshot(snapshot));

    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("reading request from stdin")?;
    let request: DeleteRequest =
        serde_json::from_str(&input).context("parsing deletion request")?;

    let (gateway, rx) = gateway::channel(&config);
    let cancel = CancellationToken::new();
    let serving = tokio::spawn({
        let store = Arc::clone(&store);
        let cancel = cancel.clone();
        async move { store.serve(rx, cancel).await }
    });

    tracing::info!(queue = gateway.queue(), "Handling deletion request");
    let engine = CascadeEngine::new(gateway, store).with_policy(config.upward_cascade);
    let outcome = Dispatcher::new(engine).handle(&request).await;

    cancel.cancel();
    serving.await.context("store task panicked")?;

    let envelope = outcome?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

//! `book-catalog` binary entrypoint.
//!
//! Loads configuration from environment variables and serves the catalog
//! over HTTP and gRPC until interrupted.

#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::{Context, Result};

use book_catalog::config::Config;
use book_catalog::observability::init_logging;
use book_catalog::transport::{self, Dispatcher};
use book_catalog::{CatalogEngine, JsonFileStore, RecordStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(config.log_format);

    let store = JsonFileStore::new(&config.store_path);
    let existing = store
        .load()
        .with_context(|| format!("opening catalog at {}", store.path().display()))?;
    tracing::info!(
        path = %store.path().display(),
        records = existing.len(),
        "catalog store ready"
    );

    let engine = CatalogEngine::new(store);
    let dispatcher = Dispatcher::new(Arc::new(engine)).with_timeout(config.request_timeout);
    tracing::info!(
        http = %config.http_addr,
        grpc = %config.grpc_addr,
        timeout_ms = dispatcher.timeout().as_millis() as u64,
        "starting transports"
    );

    let http = transport::serve(dispatcher.clone(), config.http_addr);
    let grpc = transport::serve_grpc(dispatcher, config.grpc_addr);

    tokio::select! {
        result = http => result.context("http transport stopped")?,
        result = grpc => result.context("grpc transport stopped")?,
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for shutdown signal")?;
            tracing::info!("shutdown requested");
        }
    }

    Ok(())
}

//! Shared fixtures for transport tests.

#![allow(dead_code)]

use std::sync::Arc;

use book_catalog::transport::Dispatcher;
use book_catalog::{Catalog, CatalogEngine, InMemoryStore, NewBook};

/// A dispatcher over an in-memory catalog holding two books.
pub fn seeded_dispatcher() -> (Dispatcher, InMemoryStore) {
    let store = InMemoryStore::new();
    let engine = CatalogEngine::new(store.clone());
    engine.insert(NewBook::new("Dune", "Frank Herbert", 9.99)).unwrap();
    engine
        .insert(NewBook::new("Dom Casmurro", "Machado de Assis", 45.0))
        .unwrap();
    (Dispatcher::new(Arc::new(engine)), store)
}

/// Serve the HTTP router on an ephemeral port and return its base URL.
#[cfg(feature = "http")]
pub async fn start_server(dispatcher: Dispatcher) -> String {
    let app = book_catalog::transport::router(dispatcher);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

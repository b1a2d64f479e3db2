//! Dispatcher: runs catalog calls on behalf of async transports.
//!
//! Engine calls block on store I/O, so each one runs on tokio's blocking pool.
//! The transport awaits it under a timeout. If the caller goes away, or the
//! timeout elapses, only the response is abandoned: the blocking task keeps
//! running and any save it has started completes.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{CatalogError, CatalogResult};
use crate::operation::{Catalog, Operation, Outcome};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared handle every transport holds. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    catalog: Arc<dyn Catalog>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Dispatcher {
            catalog,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run `call` against the catalog off the async executor.
    pub async fn run<T, F>(&self, operation: &'static str, call: F) -> CatalogResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn Catalog) -> CatalogResult<T> + Send + 'static,
    {
        let catalog = Arc::clone(&self.catalog);
        let span = tracing::Span::current();
        let task = tokio::task::spawn_blocking(move || {
            let _entered = span.entered();
            call(catalog.as_ref())
        });

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                tracing::error!(operation, error = %join_err, "catalog task failed");
                Err(CatalogError::storage(format!("{operation} did not complete: {join_err}")))
            }
            Err(_) => {
                let after_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(operation, after_ms, "catalog call timed out; outcome unknown");
                Err(CatalogError::Timeout { after_ms })
            }
        }
    }

    /// Run one canonical operation.
    pub async fn execute(&self, operation: Operation) -> CatalogResult<Outcome> {
        let name = operation.name();
        self.run(name, move |catalog| catalog.execute(operation)).await
    }
}

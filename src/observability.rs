//! Logging setup and span helpers.

use std::sync::Once;

use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logs.
    Json,
    /// Human-readable logs.
    #[default]
    Pretty,
}

/// Filter used when `RUST_LOG` is unset: catalog events at `info`, the
/// server stack (hyper, h2, tonic) only at `warn`.
pub const DEFAULT_LOG_FILTER: &str = "warn,book_catalog=info";

/// Install the global subscriber.
///
/// Safe to call more than once; later calls are no-ops. If another
/// subscriber is already installed (an embedding application, a test
/// harness), that one stays in charge.
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
        let registry = tracing_subscriber::registry().with(filter);

        let installed = match format {
            LogFormat::Json => registry
                .with(fmt::layer().json().with_current_span(true).with_span_list(true))
                .try_init(),
            LogFormat::Pretty => registry.with(fmt::layer().pretty().with_target(false)).try_init(),
        };
        if let Err(err) = installed {
            tracing::debug!(error = %err, "keeping the existing global subscriber");
        }
    });
}

/// Span wrapping one canonical catalog operation.
#[must_use]
pub fn catalog_span(operation: &str) -> Span {
    tracing::info_span!("catalog", op = operation)
}

/// Span wrapping one request handled by a transport.
#[must_use]
pub fn transport_span(transport: &str, operation: &str) -> Span {
    tracing::info_span!("transport", transport = transport, op = operation)
}

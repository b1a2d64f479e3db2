//! book_catalog: one file-backed book catalog behind several protocols.
//!
//! The [`CatalogEngine`] owns every read and write of a [`RecordStore`];
//! transports (behind the `http` and `grpc` features) only translate their
//! wire formats into the canonical [`Operation`]s of the [`Catalog`] trait.

pub mod config;
mod engine;
mod error;
pub mod filter;
pub mod observability;
mod operation;
mod record;
pub mod store;
mod validate;

#[cfg(any(feature = "http", feature = "grpc"))]
pub mod transport;

pub use config::{Config, ConfigError};
pub use engine::CatalogEngine;
pub use error::{CatalogError, CatalogResult};
pub use filter::{ExpressionFilter, FilterEvaluator, FilterExpr};
pub use observability::{init_logging, LogFormat};
pub use operation::{BookDelete, BookQuery, BookUpdate, Catalog, NewBook, Operation, Outcome};
pub use record::{normalize_name, Record};
pub use store::{InMemoryStore, JsonFileStore, RecordStore};
pub use validate::PriceInput;

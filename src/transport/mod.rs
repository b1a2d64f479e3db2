//! Protocol adapters over the [`Catalog`](crate::operation::Catalog)
//! interface.
//!
//! Every transport decodes its wire format into a canonical operation, runs
//! it through a shared [`Dispatcher`] and encodes the result back. None of
//! them touch the store directly.
//!
//! - `http` feature: REST routes, form-encoded RPC, a JSON command
//!   endpoint, GraphQL and SOAP, all on one axum router.
//! - `grpc` feature: a tonic service.

mod dispatch;

pub use dispatch::{Dispatcher, DEFAULT_TIMEOUT};

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub use http::{router, serve};
#[cfg(feature = "http")]
pub mod graphql;
#[cfg(feature = "http")]
pub mod soap;

#[cfg(feature = "grpc")]
pub mod grpc;
#[cfg(feature = "grpc")]
pub use grpc::{grpc_server, serve_grpc};

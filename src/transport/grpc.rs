//! gRPC transport: maps gRPC calls onto catalog operations.
//!
//! Requires the `grpc` feature. Uses tonic for the server and prost for
//! message serialization (standard protobuf wire format, no `.proto` file).
//!
//! ## RPCs
//!
//! - `Insert`: `InsertRequest` → `BookReply`.
//! - `Query`: `QueryRequest` → `BookList`.
//! - `Find`: `FindRequest` → `BookReply`, `NOT_FOUND` when nothing matches.
//! - `Update`: `UpdateRequest` → `BookReply`.
//! - `Delete`: `DeleteRequest` → `DeleteReply`.
//! - `Health`: available operations.
//!
//! Catalog errors become gRPC statuses: validation → `INVALID_ARGUMENT`,
//! not found → `NOT_FOUND`, storage → `INTERNAL`, timeout →
//! `DEADLINE_EXCEEDED`.
//!
//! ## Example
//!
//! ```ignore
//! use book_catalog::transport;
//!
//! // Get the server to compose with other tonic services
//! let grpc_svc = transport::grpc_server(dispatcher.clone());
//!
//! // Or serve directly
//! transport::serve_grpc(dispatcher, "[::1]:50051".parse()?).await?;
//! ```

use std::net::SocketAddr;

use tonic::{Request, Response, Status};
use tracing::Instrument;

use super::dispatch::Dispatcher;
use crate::error::CatalogError;
use crate::observability::transport_span;
use crate::operation::{BookDelete, BookQuery, BookUpdate, NewBook};
use crate::record::Record;
use crate::validate::PriceInput;

// ---------------------------------------------------------------------------
// Message types
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message)]
pub struct Book {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub author: String,
    #[prost(double, tag = "3")]
    pub price: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct InsertRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub author: String,
    #[prost(double, optional, tag = "3")]
    pub price: Option<f64>,
}

/// Empty strings mean "not supplied".
#[derive(Clone, PartialEq, prost::Message)]
pub struct QueryRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub filter: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FindRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, optional, tag = "2")]
    pub author: Option<String>,
    #[prost(double, optional, tag = "3")]
    pub price: Option<f64>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DeleteRequest {
    #[prost(string, tag = "1")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct BookReply {
    #[prost(message, optional, tag = "1")]
    pub book: Option<Book>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct BookList {
    #[prost(message, repeated, tag = "1")]
    pub books: Vec<Book>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DeleteReply {
    #[prost(uint64, tag = "1")]
    pub deleted: u64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct HealthRequest {}

#[derive(Clone, PartialEq, prost::Message)]
pub struct HealthReply {
    #[prost(bool, tag = "1")]
    pub ok: bool,
    #[prost(string, repeated, tag = "2")]
    pub operations: Vec<String>,
}

impl From<Record> for Book {
    fn from(record: Record) -> Self {
        Book {
            name: record.name,
            author: record.author,
            price: record.price,
        }
    }
}

fn book_reply(record: Record) -> Response<BookReply> {
    Response::new(BookReply {
        book: Some(record.into()),
    })
}

// ---------------------------------------------------------------------------
// Generated service trait + server/client
// ---------------------------------------------------------------------------

include!(concat!(env!("OUT_DIR"), "/book_catalog.CatalogService.rs"));

pub use catalog_service_client::CatalogServiceClient;
pub use catalog_service_server::{CatalogService, CatalogServiceServer};

// ---------------------------------------------------------------------------
// Handler implementation
// ---------------------------------------------------------------------------

fn to_status(err: CatalogError) -> Status {
    let message = err.to_string();
    match err {
        CatalogError::Validation { .. } => Status::invalid_argument(message),
        CatalogError::NotFound { .. } => Status::not_found(message),
        CatalogError::Storage { .. } => Status::internal(message),
        CatalogError::Timeout { .. } => Status::deadline_exceeded(message),
    }
}

/// gRPC handler implementing the generated `CatalogService` trait on top of
/// a [`Dispatcher`]. Mirrors the HTTP transport.
pub struct GrpcHandler {
    dispatcher: Dispatcher,
}

impl GrpcHandler {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

#[tonic::async_trait]
impl CatalogService for GrpcHandler {
    async fn insert(
        &self,
        request: Request<InsertRequest>,
    ) -> Result<Response<BookReply>, Status> {
        let req = request.into_inner();
        let book = NewBook {
            name: Some(req.name),
            author: Some(req.author),
            price: req.price.map(PriceInput::Number),
        };
        self.dispatcher
            .run("insert", move |catalog| catalog.insert(book))
            .instrument(transport_span("grpc", "insert"))
            .await
            .map(book_reply)
            .map_err(to_status)
    }

    async fn query(&self, request: Request<QueryRequest>) -> Result<Response<BookList>, Status> {
        let req = request.into_inner();
        let query = BookQuery {
            name: Some(req.name),
            filter: Some(req.filter),
        };
        let records = self
            .dispatcher
            .run("query", move |catalog| catalog.query(query))
            .instrument(transport_span("grpc", "query"))
            .await
            .map_err(to_status)?;
        Ok(Response::new(BookList {
            books: records.into_iter().map(Book::from).collect(),
        }))
    }

    async fn find(&self, request: Request<FindRequest>) -> Result<Response<BookReply>, Status> {
        let name = request.into_inner().name;
        self.dispatcher
            .run("find", move |catalog| catalog.find(&name))
            .instrument(transport_span("grpc", "find"))
            .await
            .map(book_reply)
            .map_err(to_status)
    }

    async fn update(
        &self,
        request: Request<UpdateRequest>,
    ) -> Result<Response<BookReply>, Status> {
        let req = request.into_inner();
        let update = BookUpdate {
            name: Some(req.name),
            author: req.author,
            price: req.price.map(PriceInput::Number),
        };
        self.dispatcher
            .run("update", move |catalog| catalog.update(update))
            .instrument(transport_span("grpc", "update"))
            .await
            .map(book_reply)
            .map_err(to_status)
    }

    async fn delete(
        &self,
        request: Request<DeleteRequest>,
    ) -> Result<Response<DeleteReply>, Status> {
        let delete = BookDelete::named(request.into_inner().name);
        let deleted = self
            .dispatcher
            .run("delete", move |catalog| catalog.delete(delete))
            .instrument(transport_span("grpc", "delete"))
            .await
            .map_err(to_status)?;
        Ok(Response::new(DeleteReply {
            deleted: deleted as u64,
        }))
    }

    async fn health(
        &self,
        _request: Request<HealthRequest>,
    ) -> Result<Response<HealthReply>, Status> {
        let operations = ["insert", "query", "find", "update", "delete"]
            .into_iter()
            .map(String::from)
            .collect();
        Ok(Response::new(HealthReply {
            ok: true,
            operations,
        }))
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Create a `CatalogServiceServer` around the given dispatcher.
pub fn grpc_server(dispatcher: Dispatcher) -> CatalogServiceServer<GrpcHandler> {
    CatalogServiceServer::new(GrpcHandler::new(dispatcher))
}

/// Bind and serve the gRPC transport at the given address.
pub async fn serve_grpc(
    dispatcher: Dispatcher,
    addr: SocketAddr,
) -> Result<(), tonic::transport::Error> {
    tracing::info!(%addr, "grpc transport listening");
    tonic::transport::Server::builder()
        .add_service(grpc_server(dispatcher))
        .serve(addr)
        .await
}

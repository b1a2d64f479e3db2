//! HTTP transport: maps HTTP requests onto catalog operations.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /health`: `{ "ok": true, "operations": [...] }`.
//! - `POST /books`: insert from a JSON body, `201` with the stored record.
//! - `GET /books?name=..&filter=..`: query, JSON array of records.
//! - `PATCH /books/:name`: update from a JSON body of `author` / `price`.
//! - `DELETE /books/:name`: delete every match, `{ "deleted": n }`.
//! - `POST /rpc/:operation`: form-encoded RPC call (`insert`, `query`,
//!   `update`, `delete`), answering with the JSON outcome.
//! - `POST /command`: JSON command: a tagged operation such as
//!   `{ "op": "delete", "name": "Dune" }`, answering with the JSON outcome.
//! - `POST /graphql`: GraphQL queries and mutations, see [`super::graphql`].
//! - `POST /soap`: SOAP envelopes, see [`super::soap`].
//!
//! Failures answer with `{ "error", "kind", "field"?, "retryable" }` and the
//! status from [`CatalogError::status_code`]. Bodies that do not decode are
//! validation failures on `body` (or `query` for the query string), never
//! axum's plain-text rejections.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use book_catalog::{transport, CatalogEngine, JsonFileStore};
//!
//! let engine = CatalogEngine::new(JsonFileStore::new("data/books.json"));
//! let dispatcher = transport::Dispatcher::new(Arc::new(engine));
//!
//! // Get the router to compose with other axum routes
//! let app = transport::router(dispatcher.clone());
//!
//! // Or serve directly
//! transport::serve(dispatcher, "0.0.0.0:5000".parse()?).await?;
//! ```

use std::net::SocketAddr;

use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Extension, Form, Json, Router};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::Instrument;

use super::dispatch::Dispatcher;
use super::graphql::{self, CatalogSchema};
use super::soap::soap_handler;
use crate::error::CatalogError;
use crate::observability::transport_span;
use crate::operation::{BookDelete, BookQuery, BookUpdate, NewBook, Operation};
use crate::validate::PriceInput;

const OPERATIONS: [&str; 4] = ["insert", "query", "update", "delete"];

/// Build an axum `Router` serving the catalog through the given dispatcher.
pub fn router(dispatcher: Dispatcher) -> Router {
    let schema = graphql::schema(dispatcher.clone());
    Router::new()
        .route("/health", get(health_handler))
        .route("/books", post(insert_handler).get(query_handler))
        .route("/books/:name", patch(update_handler).delete(delete_handler))
        .route("/rpc/:operation", post(rpc_handler))
        .route("/command", post(command_handler))
        .route("/graphql", post(graphql_handler))
        .route("/soap", post(soap_handler))
        .layer(Extension(schema))
        .with_state(dispatcher)
}

/// Serve the catalog over HTTP at the given address.
pub async fn serve(dispatcher: Dispatcher, addr: SocketAddr) -> Result<(), std::io::Error> {
    let app = router(dispatcher);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "http transport listening");
    axum::serve(listener, app).await
}

/// A catalog failure rendered as an HTTP response.
struct ApiError(CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut body = json!({
            "error": err.to_string(),
            "kind": err.kind(),
            "retryable": err.is_retryable(),
        });
        if let Some(field) = err.field() {
            body["field"] = json!(field);
        }
        (status, Json(body)).into_response()
    }
}

/// Decode a JSON body into a typed payload. Both an unreadable body and a
/// body of the wrong shape are validation failures on `body`.
fn decode<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<T, ApiError> {
    let Json(value) =
        payload.map_err(|rejection| CatalogError::validation("body", rejection.body_text()))?;
    serde_json::from_value(value)
        .map_err(|err| CatalogError::validation("body", err.to_string()).into())
}

/// `GET /health`
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true, "operations": OPERATIONS }))
}

/// `POST /books`
async fn insert_handler(
    State(dispatcher): State<Dispatcher>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let book: NewBook = decode(payload)?;
    let record = dispatcher
        .run("insert", move |catalog| catalog.insert(book))
        .instrument(transport_span("http", "insert"))
        .await?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

/// `GET /books`
async fn query_handler(
    State(dispatcher): State<Dispatcher>,
    query: Result<Query<BookQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) =
        query.map_err(|rejection| CatalogError::validation("query", rejection.body_text()))?;
    let records = dispatcher
        .run("query", move |catalog| catalog.query(query))
        .instrument(transport_span("http", "query"))
        .await?;
    Ok(Json(records).into_response())
}

/// `PATCH /books/:name`: the path names the record; the body carries the
/// fields to overwrite.
async fn update_handler(
    State(dispatcher): State<Dispatcher>,
    Path(name): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let mut update: BookUpdate = decode(payload)?;
    update.name = Some(name);
    let record = dispatcher
        .run("update", move |catalog| catalog.update(update))
        .instrument(transport_span("http", "update"))
        .await?;
    Ok(Json(record).into_response())
}

/// `DELETE /books/:name`
async fn delete_handler(
    State(dispatcher): State<Dispatcher>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let deleted = dispatcher
        .run("delete", move |catalog| catalog.delete(BookDelete::named(name)))
        .instrument(transport_span("http", "delete"))
        .await?;
    Ok(Json(json!({ "deleted": deleted })).into_response())
}

/// Fields of a form-encoded RPC call. Every value arrives as text.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RpcForm {
    #[serde(alias = "nome")]
    name: Option<String>,
    #[serde(alias = "autor")]
    author: Option<String>,
    #[serde(alias = "preco")]
    price: Option<String>,
    filter: Option<String>,
}

impl RpcForm {
    fn into_operation(self, operation: &str) -> Option<Operation> {
        let price = self.price.map(PriceInput::Text);
        let op = match operation {
            "insert" => Operation::Insert(NewBook {
                name: self.name,
                author: self.author,
                price,
            }),
            "query" => Operation::Query(BookQuery {
                name: self.name,
                filter: self.filter,
            }),
            "update" => Operation::Update(BookUpdate {
                name: self.name,
                author: self.author,
                price,
            }),
            "delete" => Operation::Delete(BookDelete { name: self.name }),
            _ => return None,
        };
        Some(op)
    }
}

/// `POST /rpc/:operation`: form-encoded body.
async fn rpc_handler(
    State(dispatcher): State<Dispatcher>,
    Path(operation): Path<String>,
    form: Result<Form<RpcForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) =
        form.map_err(|rejection| CatalogError::validation("body", rejection.body_text()))?;
    let Some(op) = form.into_operation(&operation.to_ascii_lowercase()) else {
        let body = json!({
            "error": format!("unknown operation: {operation}"),
            "kind": "unknown_operation",
            "retryable": false,
        });
        return Ok((StatusCode::NOT_FOUND, Json(body)).into_response());
    };
    let span = transport_span("rpc", op.name());
    let outcome = dispatcher.execute(op).instrument(span).await?;
    Ok(Json(outcome).into_response())
}

/// `POST /command`: JSON body holding a tagged operation.
async fn command_handler(
    State(dispatcher): State<Dispatcher>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let op: Operation = decode(payload)?;
    let span = transport_span("command", op.name());
    let outcome = dispatcher.execute(op).instrument(span).await?;
    Ok(Json(outcome).into_response())
}

/// `POST /graphql`: a standard GraphQL-over-HTTP JSON request. Resolver
/// failures travel in the GraphQL `errors` array with status 200.
async fn graphql_handler(
    Extension(schema): Extension<CatalogSchema>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request: async_graphql::Request = decode(payload)?;
    let response = schema.execute(request).await;
    Ok(Json(response).into_response())
}

//! GraphQL transport: a query/mutation schema over the catalog.
//!
//! Served by the HTTP router at `POST /graphql`.
//!
//! ```graphql
//! query { books(filter: "price < 20") { name author price } }
//! mutation { deleteBook(name: "Dune") { success message deleted } }
//! ```
//!
//! Catalog errors become GraphQL errors whose `extensions` carry `kind`,
//! `retryable` and, for validation failures, `field`. `deleteBook` reports
//! a missing name as `success: false` instead of an error.

use async_graphql::{EmptySubscription, ErrorExtensions, Object, Schema, SimpleObject};
use tracing::Instrument;

use super::dispatch::Dispatcher;
use crate::error::{CatalogError, CatalogResult};
use crate::observability::transport_span;
use crate::operation::{BookDelete, BookQuery, BookUpdate, Catalog, NewBook};
use crate::record::Record;
use crate::validate::PriceInput;

pub type CatalogSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema around a dispatcher.
pub fn schema(dispatcher: Dispatcher) -> CatalogSchema {
    Schema::build(
        QueryRoot {
            dispatcher: dispatcher.clone(),
        },
        MutationRoot { dispatcher },
        EmptySubscription,
    )
    .finish()
}

#[derive(SimpleObject)]
#[graphql(name = "Book")]
pub struct BookObject {
    name: String,
    author: String,
    price: f64,
}

impl From<Record> for BookObject {
    fn from(record: Record) -> Self {
        BookObject {
            name: record.name,
            author: record.author,
            price: record.price,
        }
    }
}

/// Result of `deleteBook`.
#[derive(SimpleObject)]
pub struct DeletionResult {
    success: bool,
    message: String,
    deleted: u64,
}

fn to_graphql_error(err: CatalogError) -> async_graphql::Error {
    let kind = err.kind().to_string();
    let retryable = err.is_retryable();
    let field = err.field().map(str::to_string);
    async_graphql::Error::new(err.to_string()).extend_with(|_, ext| {
        ext.set("kind", kind);
        ext.set("retryable", retryable);
        if let Some(field) = field {
            ext.set("field", field);
        }
    })
}

async fn run<T, F>(dispatcher: &Dispatcher, operation: &'static str, call: F) -> CatalogResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn Catalog) -> CatalogResult<T> + Send + 'static,
{
    dispatcher
        .run(operation, call)
        .instrument(transport_span("graphql", operation))
        .await
}

pub struct QueryRoot {
    dispatcher: Dispatcher,
}

#[Object]
impl QueryRoot {
    /// Books matching an optional name and filter expression, in store order.
    async fn books(
        &self,
        name: Option<String>,
        filter: Option<String>,
    ) -> async_graphql::Result<Vec<BookObject>> {
        let query = BookQuery { name, filter };
        let records = run(&self.dispatcher, "query", move |catalog| catalog.query(query))
            .await
            .map_err(to_graphql_error)?;
        Ok(records.into_iter().map(BookObject::from).collect())
    }

    /// First book with the given name, or null.
    async fn book(&self, name: String) -> async_graphql::Result<Option<BookObject>> {
        match run(&self.dispatcher, "find", move |catalog| catalog.find(&name)).await {
            Ok(record) => Ok(Some(record.into())),
            Err(CatalogError::NotFound { .. }) => Ok(None),
            Err(err) => Err(to_graphql_error(err)),
        }
    }
}

pub struct MutationRoot {
    dispatcher: Dispatcher,
}

#[Object]
impl MutationRoot {
    async fn insert_book(
        &self,
        name: String,
        author: String,
        price: f64,
    ) -> async_graphql::Result<BookObject> {
        let book = NewBook {
            name: Some(name),
            author: Some(author),
            price: Some(PriceInput::Number(price)),
        };
        run(&self.dispatcher, "insert", move |catalog| catalog.insert(book))
            .await
            .map(BookObject::from)
            .map_err(to_graphql_error)
    }

    /// Overwrite the supplied fields of the first book with this name.
    async fn update_book(
        &self,
        name: String,
        author: Option<String>,
        price: Option<f64>,
    ) -> async_graphql::Result<BookObject> {
        let update = BookUpdate {
            name: Some(name),
            author,
            price: price.map(PriceInput::Number),
        };
        run(&self.dispatcher, "update", move |catalog| catalog.update(update))
            .await
            .map(BookObject::from)
            .map_err(to_graphql_error)
    }

    /// Remove every book with this name.
    async fn delete_book(&self, name: String) -> async_graphql::Result<DeletionResult> {
        let delete = BookDelete::named(name);
        match run(&self.dispatcher, "delete", move |catalog| catalog.delete(delete)).await {
            Ok(count) => Ok(DeletionResult {
                success: true,
                message: format!("{count} book(s) removed"),
                deleted: count as u64,
            }),
            Err(err @ CatalogError::NotFound { .. }) => Ok(DeletionResult {
                success: false,
                message: err.to_string(),
                deleted: 0,
            }),
            Err(err) => Err(to_graphql_error(err)),
        }
    }
}

//! Canonical operations: the protocol-agnostic surface of the catalog.
//!
//! Transports decode their wire format into one of these payloads, call the
//! [`Catalog`] interface and encode the [`Outcome`] back. Payload fields are
//! `Option`s on purpose: presence is checked by the engine, not by adapters.
//!
//! ## Example
//!
//! ```ignore
//! use book_catalog::{Catalog, NewBook, Operation};
//!
//! let op: Operation = serde_json::from_str(
//!     r#"{ "op": "insert", "name": "Dune", "author": "Frank Herbert", "price": 9.99 }"#,
//! )?;
//! let outcome = catalog.execute(op)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};
use crate::record::Record;
use crate::validate::{require_text, PriceInput};

/// Insert payload. All three fields are required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewBook {
    #[serde(alias = "nome")]
    pub name: Option<String>,
    #[serde(alias = "autor")]
    pub author: Option<String>,
    #[serde(alias = "preco")]
    pub price: Option<PriceInput>,
}

impl NewBook {
    pub fn new(name: impl Into<String>, author: impl Into<String>, price: impl Into<PriceInput>) -> Self {
        NewBook {
            name: Some(name.into()),
            author: Some(author.into()),
            price: Some(price.into()),
        }
    }
}

/// Query payload. With neither field set, every record is returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookQuery {
    #[serde(alias = "nome")]
    pub name: Option<String>,
    pub filter: Option<String>,
}

impl BookQuery {
    pub fn all() -> Self {
        BookQuery::default()
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        BookQuery {
            name: Some(name.into()),
            filter: None,
        }
    }

    pub fn filtered(expression: impl Into<String>) -> Self {
        BookQuery {
            name: None,
            filter: Some(expression.into()),
        }
    }
}

/// Update payload. `name` selects the record; at least one of `author` and
/// `price` must be supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookUpdate {
    #[serde(alias = "nome")]
    pub name: Option<String>,
    #[serde(alias = "autor")]
    pub author: Option<String>,
    #[serde(alias = "preco")]
    pub price: Option<PriceInput>,
}

impl BookUpdate {
    pub fn named(name: impl Into<String>) -> Self {
        BookUpdate {
            name: Some(name.into()),
            ..BookUpdate::default()
        }
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn price(mut self, price: impl Into<PriceInput>) -> Self {
        self.price = Some(price.into());
        self
    }
}

/// Delete payload. Every record matching `name` is removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookDelete {
    #[serde(alias = "nome")]
    pub name: Option<String>,
}

impl BookDelete {
    pub fn named(name: impl Into<String>) -> Self {
        BookDelete {
            name: Some(name.into()),
        }
    }
}

/// One canonical operation, tagged by `op` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Insert(NewBook),
    Query(BookQuery),
    Update(BookUpdate),
    Delete(BookDelete),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Insert(_) => "insert",
            Operation::Query(_) => "query",
            Operation::Update(_) => "update",
            Operation::Delete(_) => "delete",
        }
    }
}

/// The canonical result of an [`Operation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum Outcome {
    Inserted { record: Record },
    Records { records: Vec<Record> },
    Updated { record: Record },
    Deleted { count: usize },
}

/// The operation interface every transport depends on.
///
/// Implementations must be safe to call from many threads at once.
pub trait Catalog: Send + Sync {
    /// Append a new record.
    fn insert(&self, book: NewBook) -> CatalogResult<Record>;

    /// Records matching the query, in store order. May be empty.
    fn query(&self, query: BookQuery) -> CatalogResult<Vec<Record>>;

    /// Overwrite the supplied fields of the first record matching the name.
    fn update(&self, update: BookUpdate) -> CatalogResult<Record>;

    /// Remove every record matching the name and return how many went.
    fn delete(&self, delete: BookDelete) -> CatalogResult<usize>;

    /// First record matching `name`, or `NotFound`. A blank name is a
    /// validation error rather than a match on everything.
    fn find(&self, name: &str) -> CatalogResult<Record> {
        let name = require_text("name", Some(name))?;
        self.query(BookQuery::by_name(name.as_str()))?
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::not_found(name))
    }

    /// Run any canonical operation.
    fn execute(&self, operation: Operation) -> CatalogResult<Outcome> {
        match operation {
            Operation::Insert(book) => self.insert(book).map(|record| Outcome::Inserted { record }),
            Operation::Query(query) => self.query(query).map(|records| Outcome::Records { records }),
            Operation::Update(update) => self.update(update).map(|record| Outcome::Updated { record }),
            Operation::Delete(delete) => self.delete(delete).map(|count| Outcome::Deleted { count }),
        }
    }
}

//! CatalogEngine: canonical operation semantics over a record store.
//!
//! The engine is stateless between calls. Each operation validates its input,
//! then runs one load → mutate → save cycle while holding the store lock:
//! mutations take the write side for the whole cycle, queries take the read
//! side for their load. Nothing else in the crate touches the store.
//!
//! ## Example
//!
//! ```ignore
//! use book_catalog::{BookQuery, BookUpdate, Catalog, CatalogEngine, JsonFileStore, NewBook};
//!
//! let engine = CatalogEngine::new(JsonFileStore::new("data/books.json"));
//! engine.insert(NewBook::new("Dune", "Frank Herbert", 9.99))?;
//! engine.update(BookUpdate::named("dune").price(12.5))?;
//! let books = engine.query(BookQuery::filtered("price > 10"))?;
//! ```

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{CatalogError, CatalogResult};
use crate::filter::{ExpressionFilter, FilterEvaluator};
use crate::observability::catalog_span;
use crate::operation::{BookDelete, BookQuery, BookUpdate, Catalog, NewBook};
use crate::record::Record;
use crate::store::RecordStore;
use crate::validate::{optional_text, parse_price, require_text};

/// The single component allowed to mutate a [`RecordStore`].
///
/// The lock lives in the engine, not in the document: within one process,
/// exactly one engine may own a given store location, shared through `Arc`.
/// Two engines over the same file do not serialize against each other.
pub struct CatalogEngine<S, F = ExpressionFilter> {
    store: RwLock<S>,
    filter: F,
}

impl<S: RecordStore> CatalogEngine<S> {
    /// Engine with the default filter-expression evaluator.
    pub fn new(store: S) -> Self {
        Self::with_filter(store, ExpressionFilter)
    }
}

impl<S: RecordStore, F: FilterEvaluator> CatalogEngine<S, F> {
    /// Engine with a custom filter evaluator.
    pub fn with_filter(store: S, filter: F) -> Self {
        CatalogEngine {
            store: RwLock::new(store),
            filter,
        }
    }

    fn read(&self, op: &str) -> CatalogResult<RwLockReadGuard<'_, S>> {
        self.store
            .read()
            .map_err(|_| CatalogError::storage(format!("catalog lock poisoned during {op}")))
    }

    fn write(&self, op: &str) -> CatalogResult<RwLockWriteGuard<'_, S>> {
        self.store
            .write()
            .map_err(|_| CatalogError::storage(format!("catalog lock poisoned during {op}")))
    }
}

impl<S: RecordStore, F: FilterEvaluator> Catalog for CatalogEngine<S, F> {
    fn insert(&self, book: NewBook) -> CatalogResult<Record> {
        let _span = catalog_span("insert").entered();

        let name = require_text("name", book.name.as_deref())?;
        let author = require_text("author", book.author.as_deref())?;
        let price = match book.price.as_ref().filter(|price| !price.is_blank()) {
            Some(price) => parse_price(price)?,
            None => return Err(CatalogError::validation("price", "is required")),
        };
        let record = Record::new(name, author, price);

        let store = self.write("insert")?;
        let mut records = store.load()?;
        records.push(record.clone());
        store.save(&records).inspect_err(|err| {
            tracing::warn!(error = %err, name = %record.name, "insert not persisted");
        })?;

        tracing::info!(name = %record.name, total = records.len(), "book inserted");
        Ok(record)
    }

    fn query(&self, query: BookQuery) -> CatalogResult<Vec<Record>> {
        let _span = catalog_span("query").entered();

        let name = optional_text(query.name.as_deref());
        let expression = optional_text(query.filter.as_deref());
        if let Some(expression) = &expression {
            self.filter.validate(expression)?;
        }

        let mut records = self.read("query")?.load()?;
        if let Some(name) = &name {
            records.retain(|record| record.matches_name(name));
        }
        if let Some(expression) = &expression {
            records = self.filter.select(expression, records)?;
        }

        tracing::debug!(
            name = name.as_deref(),
            filter = expression.as_deref(),
            matched = records.len(),
            "books queried"
        );
        Ok(records)
    }

    fn update(&self, update: BookUpdate) -> CatalogResult<Record> {
        let _span = catalog_span("update").entered();

        let name = require_text("name", update.name.as_deref())?;
        let author = optional_text(update.author.as_deref());
        let price = match update.price.as_ref().filter(|price| !price.is_blank()) {
            Some(price) => Some(parse_price(price)?),
            None => None,
        };
        if author.is_none() && price.is_none() {
            return Err(CatalogError::validation(
                "update",
                "at least one of author or price is required",
            ));
        }

        let store = self.write("update")?;
        let mut records = store.load()?;
        // Only the first match changes; duplicates keep their values.
        let record = records
            .iter_mut()
            .find(|record| record.matches_name(&name))
            .ok_or_else(|| CatalogError::not_found(name.as_str()))?;
        if let Some(author) = author {
            record.author = author;
        }
        if let Some(price) = price {
            record.price = price;
        }
        let updated = record.clone();

        store.save(&records).inspect_err(|err| {
            tracing::warn!(error = %err, name = %name, "update not persisted");
        })?;

        tracing::info!(name = %updated.name, "book updated");
        Ok(updated)
    }

    fn delete(&self, delete: BookDelete) -> CatalogResult<usize> {
        let _span = catalog_span("delete").entered();

        let name = require_text("name", delete.name.as_deref())?;

        let store = self.write("delete")?;
        let mut records = store.load()?;
        let before = records.len();
        records.retain(|record| !record.matches_name(&name));
        let removed = before - records.len();
        if removed == 0 {
            return Err(CatalogError::not_found(name));
        }

        store.save(&records).inspect_err(|err| {
            tracing::warn!(error = %err, name = %name, "delete not persisted");
        })?;

        tracing::info!(name = %name, removed, "books deleted");
        Ok(removed)
    }
}

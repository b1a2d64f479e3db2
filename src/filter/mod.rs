//! Structured filter expressions for Query.
//!
//! The engine treats filtering as an injected capability: anything that
//! implements [`FilterEvaluator`] can select records from a query string.
//! [`ExpressionFilter`] is the default and understands a small grammar of
//! field comparisons joined by `and` / `&&`:
//!
//! ```text
//! name = 'Dune'
//! author ~ herbert and price < 20
//! price >= 10 && price <= 15
//! ```
//!
//! Fields are `name`, `author` and `price`. Text comparisons ignore case;
//! `~` is a substring match; `price` only compares against numbers.

mod parser;

pub use parser::FilterExpr;

use crate::error::CatalogResult;
use crate::record::Record;

/// Selects records matching a filter expression.
///
/// Implementations must reject malformed expressions with a
/// `Validation` error on the `filter` field, before evaluating anything.
pub trait FilterEvaluator: Send + Sync {
    /// Check an expression without evaluating it.
    fn validate(&self, expression: &str) -> CatalogResult<()>;

    /// Keep the records matching `expression`, preserving order.
    fn select(&self, expression: &str, records: Vec<Record>) -> CatalogResult<Vec<Record>>;
}

/// The default evaluator backed by [`FilterExpr`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionFilter;

impl FilterEvaluator for ExpressionFilter {
    fn validate(&self, expression: &str) -> CatalogResult<()> {
        FilterExpr::parse(expression).map(|_| ())
    }

    fn select(&self, expression: &str, records: Vec<Record>) -> CatalogResult<Vec<Record>> {
        let expr = FilterExpr::parse(expression)?;
        Ok(records.into_iter().filter(|record| expr.matches(record)).collect())
    }
}

//! Input validation shared by every operation.
//!
//! Transports hand the engine raw, possibly-missing values; the checks here
//! decide whether they may reach the store.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// A price as it arrives on the wire.
///
/// JSON transports send numbers, form-encoded and envelope transports send
/// text. Both are parsed by [`parse_price`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    /// Blank text counts as "no price supplied".
    pub fn is_blank(&self) -> bool {
        matches!(self, PriceInput::Text(text) if text.trim().is_empty())
    }
}

impl From<f64> for PriceInput {
    fn from(value: f64) -> Self {
        PriceInput::Number(value)
    }
}

impl From<&str> for PriceInput {
    fn from(value: &str) -> Self {
        PriceInput::Text(value.to_string())
    }
}

/// Require a field to be present and non-blank, returning it trimmed.
pub fn require_text(field: &str, value: Option<&str>) -> CatalogResult<String> {
    match value.map(str::trim) {
        None => Err(CatalogError::validation(field, "is required")),
        Some("") => Err(CatalogError::validation(field, "must not be blank")),
        Some(text) => Ok(text.to_string()),
    }
}

/// Trimmed text, or `None` when absent or blank.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// Parse a price into a finite, non-negative number.
pub fn parse_price(input: &PriceInput) -> CatalogResult<f64> {
    let value = match input {
        PriceInput::Number(value) => *value,
        PriceInput::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| CatalogError::validation("price", format!("'{}' is not a number", text.trim())))?,
    };
    if !value.is_finite() {
        return Err(CatalogError::validation("price", "must be a finite number"));
    }
    if value < 0.0 {
        return Err(CatalogError::validation("price", "must not be negative"));
    }
    Ok(value)
}

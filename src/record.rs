use serde::{Deserialize, Serialize};

/// One catalog entry.
///
/// Records carry no surrogate id. Their identity is the normalized name, and
/// several records may share it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    pub author: String,
    pub price: f64,
}

impl Record {
    pub fn new(name: impl Into<String>, author: impl Into<String>, price: f64) -> Self {
        Record {
            name: name.into(),
            author: author.into(),
            price,
        }
    }

    /// Normalized identity key of this record.
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    /// Case-insensitive, whitespace-insensitive name match.
    pub fn matches_name(&self, name: &str) -> bool {
        self.key() == normalize_name(name)
    }
}

/// Trim and lowercase a name into its identity key.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

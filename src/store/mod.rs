//! Record stores: durable persistence of the ordered record collection.
//!
//! A store only knows how to read and replace the whole collection. It does
//! no validation and no locking of its own; the catalog engine serializes
//! every load/save pair.

mod file;
mod in_memory;

pub use file::JsonFileStore;
pub use in_memory::InMemoryStore;

use crate::error::CatalogResult;
use crate::record::Record;

/// Abstract whole-document storage for catalog records.
pub trait RecordStore: Send + Sync {
    /// Read every record in store order.
    ///
    /// Returns an empty collection when nothing has been stored yet. Fails
    /// with `Storage` when the backing document exists but is unreadable.
    fn load(&self) -> CatalogResult<Vec<Record>>;

    /// Replace the stored collection with `records`.
    ///
    /// A subsequent `load` observes either the previous collection or this
    /// one, never a mix.
    fn save(&self, records: &[Record]) -> CatalogResult<()>;
}

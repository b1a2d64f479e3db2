//! Shared fixtures: an engine over a fresh document in a temp directory.

use std::path::PathBuf;

use book_catalog::{Catalog, CatalogEngine, JsonFileStore, NewBook};
use tempfile::TempDir;

pub struct Fixture {
    // Held so the directory outlives the engine.
    pub dir: TempDir,
    pub engine: CatalogEngine<JsonFileStore>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let engine = CatalogEngine::new(JsonFileStore::new(dir.path().join("books.json")));
        Fixture { dir, engine }
    }

    pub fn seeded() -> Self {
        let fixture = Self::new();
        for (name, author, price) in [
            ("Dune", "Frank Herbert", 9.99),
            ("Dom Casmurro", "Machado de Assis", 45.0),
            ("Neuromancer", "William Gibson", 14.5),
        ] {
            fixture.engine.insert(NewBook::new(name, author, price)).unwrap();
        }
        fixture
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("books.json")
    }

    /// A second engine over the same document, as after a restart.
    pub fn reopen(&self) -> CatalogEngine<JsonFileStore> {
        CatalogEngine::new(JsonFileStore::new(self.path()))
    }
}

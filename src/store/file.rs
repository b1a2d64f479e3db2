use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::RecordStore;
use crate::error::{CatalogError, CatalogResult};
use crate::record::Record;

/// On-disk layout: a single root container holding the ordered records.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    books: Vec<Record>,
}

/// File-backed store keeping the whole catalog in one JSON document.
///
/// Saves write a sibling temp file, fsync it and rename it over the target,
/// so readers see either the old or the new document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tmp_seq: AtomicU64,
}

impl JsonFileStore {
    /// Point a store at `path`. Nothing touches the disk until the first
    /// `load` or `save`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            tmp_seq: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> CatalogResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                CatalogError::storage(format!(
                    "create store directory {} failed: {err}",
                    parent.display()
                ))
            })?;
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "catalog".to_string());
        self.path
            .with_file_name(format!(".{file_name}.{}.{seq}.tmp", std::process::id()))
    }

    fn write_document(&self, document: &CatalogDocument) -> CatalogResult<()> {
        self.ensure_parent()?;
        let raw = serde_json::to_vec_pretty(document)
            .map_err(|err| CatalogError::storage(format!("serialize catalog failed: {err}")))?;

        let tmp = self.tmp_path();
        let written = File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(&raw)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));

        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(CatalogError::storage(format!(
                "write {} failed: {err}",
                self.path.display()
            )));
        }
        Ok(())
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> CatalogResult<Vec<Record>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "creating empty catalog document");
                self.write_document(&CatalogDocument::default())?;
                return Ok(Vec::new());
            }
            Err(err) => {
                return Err(CatalogError::storage(format!(
                    "read {} failed: {err}",
                    self.path.display()
                )))
            }
        };

        let document: CatalogDocument = serde_json::from_slice(&raw).map_err(|err| {
            CatalogError::storage(format!(
                "{} is not a valid catalog document: {err}",
                self.path.display()
            ))
        })?;

        for (index, record) in document.books.iter().enumerate() {
            if !record.price.is_finite() || record.price < 0.0 {
                return Err(CatalogError::storage(format!(
                    "{} record {index} has invalid price {}",
                    self.path.display(),
                    record.price
                )));
            }
        }

        Ok(document.books)
    }

    fn save(&self, records: &[Record]) -> CatalogResult<()> {
        self.write_document(&CatalogDocument {
            books: records.to_vec(),
        })
    }
}

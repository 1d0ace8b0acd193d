use std::path::Path;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::info;

use crate::common::TableId;
use crate::error::{DbResult, Error};
use crate::storage::heap::file::HeapFile;
use crate::tuple::schema::Schema;

/// Keeps track of the heap files attached to the database, keyed by their table id.
pub struct Catalog {
    tables: DashMap<TableId, Arc<HeapFile>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    /// Attaches the file at `path` as a table.
    /// Attaching the same file twice returns the heap file attached first. Fails if another
    /// file already uses the table id derived from `path`.
    pub fn attach(&self, path: impl AsRef<Path>, schema: Schema) -> DbResult<Arc<HeapFile>> {
        let heap_file = HeapFile::new(path, schema)?;
        match self.tables.entry(heap_file.id()) {
            Entry::Occupied(entry) if entry.get().path() == heap_file.path() => {
                Ok(Arc::clone(entry.get()))
            }
            Entry::Occupied(_) => Err(Error::DuplicateTableId {
                table_id: heap_file.id(),
                path: heap_file.path().to_path_buf(),
            }),
            Entry::Vacant(entry) => {
                info!(
                    table_id = heap_file.id(),
                    path = %heap_file.path().display(),
                    "attached heap file"
                );
                let heap_file = Arc::new(heap_file);
                entry.insert(Arc::clone(&heap_file));
                Ok(heap_file)
            }
        }
    }

    pub fn get(&self, table_id: TableId) -> DbResult<Arc<HeapFile>> {
        self.tables
            .get(&table_id)
            .map(|heap_file| Arc::clone(heap_file.value()))
            .ok_or(Error::UnknownTable(table_id))
    }

    /// Returns the ids of all attached tables in ascending order.
    pub fn table_ids(&self) -> Vec<TableId> {
        let mut table_ids = self
            .tables
            .iter()
            .map(|entry| *entry.key())
            .collect::<Vec<_>>();
        table_ids.sort_unstable();
        table_ids
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

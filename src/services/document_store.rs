//! Read-only key-value store of annotation documents
//!
//! Backed by [redb](https://github.com/cberner/redb). A store file holds
//! string tables; the comparison driver reads annotation documents from
//! `documents` and the converter reads display names from `names`.
//!
//! Stores are opened without any write transaction and never explicitly
//! closed; the handle lives until the run ends.

use redb::{Database, ReadableTable, TableDefinition, TableError};
use std::path::{Path, PathBuf};

/// File extension that marks a path as a document store
pub const STORE_EXTENSION: &str = "redb";

/// Table of annotation documents keyed by file name
pub const DOCUMENTS_TABLE: &str = "documents";

/// Table of tagger serial -> display name
pub const NAMES_TABLE: &str = "names";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no such store: {0}")]
    NotFound(PathBuf),

    #[error("database error: {0}")]
    DatabaseError(String),
}

fn database_error<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::DatabaseError(format!("{}: {}", context, e))
}

/// Whether `path` names a document store rather than a plain file
pub fn is_store(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == STORE_EXTENSION)
}

pub struct DocumentStore {
    db: Database,
    table: String,
    path: PathBuf,
}

impl DocumentStore {
    /// Open an existing store for reading one table
    pub fn open(path: &Path, table: &str) -> Result<Self, StoreError> {
        if !path.is_file() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        let db = Database::open(path).map_err(database_error("failed to open database"))?;
        Ok(Self {
            db,
            table: table.to_string(),
            path: path.to_path_buf(),
        })
    }

    /// Create a store holding one table with the given entries
    ///
    /// Overwrites any existing file.
    pub fn create<K, V>(
        path: &Path,
        table: &str,
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, StoreError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let db = Database::create(path).map_err(database_error("failed to create database"))?;
        {
            let write_txn = db
                .begin_write()
                .map_err(database_error("failed to begin write transaction"))?;
            {
                let mut writer = write_txn
                    .open_table(TableDefinition::<&'static str, &'static str>::new(table))
                    .map_err(database_error("failed to create table"))?;
                for (key, value) in entries {
                    writer
                        .insert(key.as_ref(), value.as_ref())
                        .map_err(database_error("failed to insert entry"))?;
                }
            }
            write_txn
                .commit()
                .map_err(database_error("failed to commit entries"))?;
        }
        Ok(Self {
            db,
            table: table.to_string(),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn definition(&self) -> TableDefinition<'_, &'static str, &'static str> {
        TableDefinition::new(&self.table)
    }

    /// Value stored under `key`; a missing table reads as empty
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(database_error("failed to begin read transaction"))?;
        let table = match read_txn.open_table(self.definition()) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(database_error("failed to open table")(e)),
        };
        let value = table
            .get(key)
            .map_err(database_error("failed to read entry"))?;
        Ok(value.map(|v| v.value().to_string()))
    }

    /// All entries in key order
    pub fn entries(&self) -> Result<Vec<(String, String)>, StoreError> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(database_error("failed to begin read transaction"))?;
        let table = match read_txn.open_table(self.definition()) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(database_error("failed to open table")(e)),
        };

        let mut entries = Vec::new();
        for item in table.iter().map_err(database_error("failed to iterate table"))? {
            let (key, value) = item.map_err(database_error("failed to read entry"))?;
            entries.push((key.value().to_string(), value.value().to_string()));
        }
        Ok(entries)
    }
}

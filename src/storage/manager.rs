// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::collections::HashMap;
use std::fmt;

use itertools::Itertools;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::{StorageResult, Table, TracedStorageError};

/// Registry of named tables.
///
/// There is no global instance: create one and pass it to whoever needs to
/// look up tables by name.
#[derive(Default)]
pub struct StorageManager {
    tables: Mutex<HashMap<String, Table>>,
}

impl StorageManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&self, name: impl Into<String>, table: Table) -> StorageResult<()> {
        let name = name.into();
        let mut tables = self.tables.lock();
        if tables.contains_key(&name) {
            return Err(TracedStorageError::duplicated("table", name));
        }
        debug!(table = %name, columns = table.column_count(), "added table");
        tables.insert(name, table);
        Ok(())
    }

    pub fn drop_table(&self, name: &str) -> StorageResult<()> {
        let mut tables = self.tables.lock();
        match tables.remove(name) {
            Some(_) => {
                debug!(table = %name, "dropped table");
                Ok(())
            }
            None => Err(TracedStorageError::not_found("table", name)),
        }
    }

    /// Returns a handle to the table called `name`.
    pub fn get_table(&self, name: &str) -> StorageResult<Table> {
        let tables = self.tables.lock();
        tables
            .get(name)
            .cloned()
            .ok_or_else(|| TracedStorageError::not_found("table", name))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.lock().contains_key(name)
    }

    /// Names of all tables in ascending order.
    pub fn table_names(&self) -> Vec<String> {
        self.tables.lock().keys().sorted().cloned().collect()
    }

    /// Drop all tables.
    pub fn reset(&self) {
        let mut tables = self.tables.lock();
        info!(count = tables.len(), "reset storage manager");
        tables.clear();
    }
}

/// One line per table, ordered by name.
impl fmt::Display for StorageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tables = self.tables.lock();
        for (name, table) in tables.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            writeln!(
                f,
                "Table name: {}, #columns: {}, #rows: {}, #chunks: {}",
                name,
                table.column_count(),
                table.row_count(),
                table.chunk_count()
            )?;
        }
        Ok(())
    }
}

impl fmt::Debug for StorageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageManager")
            .field("tables", &self.table_names())
            .finish()
    }
}

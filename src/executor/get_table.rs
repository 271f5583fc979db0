// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::sync::Arc;

use super::*;
use crate::storage::StorageManager;

/// Looks up a table by name.
pub struct GetTableExecutor {
    pub storage: Arc<StorageManager>,
    pub table_name: String,
}

impl GetTableExecutor {
    pub fn new(storage: Arc<StorageManager>, table_name: impl Into<String>) -> Self {
        GetTableExecutor {
            storage,
            table_name: table_name.into(),
        }
    }
}

impl Executor for GetTableExecutor {
    fn execute(&self) -> Result<Table> {
        Ok(self.storage.get_table(&self.table_name)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn test_get_table() {
        let storage = Arc::new(StorageManager::new());
        let table = Table::new(2);
        storage.add_table("aNiceTestTable", table.clone()).unwrap();

        let executor = GetTableExecutor::new(storage.clone(), "aNiceTestTable");
        assert!(executor.execute().unwrap().same_table(&table));

        let executor = GetTableExecutor::new(storage, "aTableThatDoesNotExist");
        let err = executor.execute().unwrap_err();
        assert!(matches!(
            err.as_storage(),
            Some(StorageError::NotFound("table", _))
        ));
    }
}

// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use super::*;

/// Feeds an existing table into a pipeline.
pub struct TableWrapperExecutor {
    pub table: Table,
}

impl TableWrapperExecutor {
    pub fn new(table: Table) -> Self {
        TableWrapperExecutor { table }
    }
}

impl Executor for TableWrapperExecutor {
    fn execute(&self) -> Result<Table> {
        Ok(self.table.clone())
    }
}

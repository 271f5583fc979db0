// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Operators producing tables.
//!
//! Every executor produces exactly one [`Table`] when executed. Sources read a
//! table from the [`StorageManager`](crate::storage::StorageManager) or wrap an
//! existing one; [`TableScanExecutor`] filters the output of its child and
//! returns a table of reference segments pointing at the base table.

use crate::storage::Table;

mod error;
mod get_table;
mod table_scan;
mod table_wrapper;

pub use self::error::{Error, Result};
pub use self::get_table::GetTableExecutor;
pub use self::table_scan::{scan_table, ScanType, TableScanExecutor};
pub use self::table_wrapper::TableWrapperExecutor;

pub type BoxedExecutor = Box<dyn Executor>;

/// A node of an operator pipeline.
pub trait Executor: Send + Sync {
    /// Run the operator, executing its inputs first.
    fn execute(&self) -> Result<Table>;
}

//! An in-memory, column-oriented storage engine core.
//!
//! Tables are split into chunks of a fixed target size. Every chunk stores one
//! segment per column, either verbatim ([`storage::ValueSegment`]) or
//! dictionary-encoded ([`storage::DictionarySegment`]). A
//! [`executor::TableScanExecutor`] filters a table by a comparison predicate
//! and yields a table of [`storage::ReferenceSegment`]s pointing at the rows of
//! its base table.
//!
//! ```
//! use std::sync::Arc;
//!
//! use tessera::executor::{Executor, GetTableExecutor, ScanType, TableScanExecutor};
//! use tessera::storage::{StorageManager, Table};
//! use tessera::types::DataValue;
//!
//! let storage = Arc::new(StorageManager::new());
//! let table = Table::new(2);
//! table.add_column("name", "string").unwrap();
//! for name in ["Bill", "Steve", "Alexander"] {
//!     table.append(&[DataValue::from(name)]).unwrap();
//! }
//! table.compress_chunk(0).unwrap();
//! storage.add_table("people", table).unwrap();
//!
//! let scan = TableScanExecutor::new(
//!     Box::new(GetTableExecutor::new(storage, "people")),
//!     0,
//!     ScanType::OpLessThan,
//!     "Steve",
//! );
//! assert_eq!(scan.execute().unwrap().row_count(), 2);
//! ```

#![deny(unused_must_use)]

pub mod executor;
pub mod storage;
pub mod types;

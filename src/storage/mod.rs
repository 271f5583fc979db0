// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! In-memory columnar storage.
//!
//! A [`Table`] is a list of [`Chunk`]s, and a chunk holds one [`Segment`] per
//! column. Segments come in three flavors:
//!
//! * [`ValueSegment`]: values stored verbatim, the only appendable segment.
//! * [`DictionarySegment`]: a sorted dictionary plus fixed-width codes, built
//!   by [`encode_dictionary`] when a chunk is compressed.
//! * [`ReferenceSegment`]: a position list into another table, produced by
//!   scans. Reads are resolved against the referenced table on every access,
//!   so compressing a chunk of the base table is visible through all derived
//!   tables.
//!
//! Tables are registered by name in a [`StorageManager`].

mod chunk;
mod encoding;
mod error;
mod manager;
mod options;
mod segment;
mod table;

pub use self::chunk::Chunk;
pub use self::encoding::{encode_dictionary, minimal_code_width};
pub use self::error::{StorageError, StorageResult, TracedStorageError};
pub use self::manager::StorageManager;
pub use self::options::{TableOptions, DEFAULT_CHUNK_SIZE};
pub use self::segment::*;
pub use self::table::Table;

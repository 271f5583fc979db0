// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Column types, scalar values and row addressing.

use std::sync::Arc;

use parse_display::Display;
use serde::{Deserialize, Serialize};

mod native;
mod resolve;
mod value;

pub use self::native::*;
pub use self::resolve::*;
pub use self::value::*;

/// Index of a chunk inside a table.
pub type ChunkId = u32;
/// Offset of a row inside a chunk.
pub type ChunkOffset = u32;
/// Index of a column inside a table.
pub type ColumnId = u32;

/// `for_all_types` includes all column types supported by the engine.
///
/// It invokes `$macro` with a list of `{ Variant, NativeType }` pairs, where
/// `Variant` is the shared name used by [`DataTypeKind`], [`DataValue`] and the
/// typed segment enums.
#[macro_export]
macro_rules! for_all_types {
    ($macro:ident $(, $x:tt)*) => {
        $macro! {
            [$($x),*],
            { Int32, i32 },
            { Int64, i64 },
            { Float32, $crate::types::F32 },
            { Float64, $crate::types::F64 },
            { String, String }
        }
    };
}

/// The concrete type of a column.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataTypeKind {
    #[display("int")]
    Int32,
    #[display("long")]
    Int64,
    #[display("float")]
    Float32,
    #[display("double")]
    Float64,
    #[display("string")]
    String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("failed to cast {0} to {1}")]
    Cast(String, DataTypeKind),
    #[error("unknown type: {0}")]
    UnknownType(String),
}

/// Identifies one physical row of a table.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[display("({chunk_id}, {chunk_offset})")]
pub struct RowId {
    pub chunk_id: ChunkId,
    pub chunk_offset: ChunkOffset,
}

impl RowId {
    pub const fn new(chunk_id: ChunkId, chunk_offset: ChunkOffset) -> Self {
        RowId {
            chunk_id,
            chunk_offset,
        }
    }
}

/// An ordered list of rows of one table. The order is the presentation order
/// of the rows in a derived table.
pub type PosList = Vec<RowId>;

/// All columns of a derived table share one position list.
pub type PosListRef = Arc<PosList>;

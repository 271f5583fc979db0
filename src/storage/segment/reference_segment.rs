// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;
use std::mem::size_of;

use crate::storage::{StorageResult, Table, TracedStorageError};
use crate::types::{ChunkOffset, ColumnId, DataValue, PosListRef, RowId};

/// An immutable segment whose rows live in another table.
///
/// The segment never caches a chunk or segment of the referenced table. Every
/// read looks up `(table, column, row id)` again, so it stays valid when a
/// chunk of the referenced table is replaced by its compressed version.
#[derive(Clone)]
pub struct ReferenceSegment {
    table: Table,
    column_id: ColumnId,
    pos_list: PosListRef,
}

impl ReferenceSegment {
    pub fn new(table: Table, column_id: ColumnId, pos_list: PosListRef) -> Self {
        ReferenceSegment {
            table,
            column_id,
            pos_list,
        }
    }

    /// Read the value of row `offset` from the referenced table.
    pub fn get(&self, offset: ChunkOffset) -> StorageResult<DataValue> {
        let row_id = self.row_id(offset)?;
        self.table.get_value(self.column_id, row_id)
    }

    pub fn row_id(&self, offset: ChunkOffset) -> StorageResult<RowId> {
        self.pos_list
            .get(offset as usize)
            .copied()
            .ok_or_else(|| TracedStorageError::out_of_range("reference segment", offset, self.len()))
    }

    pub fn pos_list(&self) -> &PosListRef {
        &self.pos_list
    }

    pub fn referenced_table(&self) -> &Table {
        &self.table
    }

    pub fn referenced_column_id(&self) -> ColumnId {
        self.column_id
    }

    pub fn len(&self) -> usize {
        self.pos_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos_list.is_empty()
    }

    /// Only the position list is counted, not the referenced data.
    pub fn estimate_memory_usage(&self) -> usize {
        self.len() * size_of::<RowId>()
    }
}

impl fmt::Debug for ReferenceSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceSegment")
            .field("column_id", &self.column_id)
            .field("rows", &self.pos_list.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::StorageError;

    fn build_table() -> Table {
        let table = Table::new(2);
        table.add_column("a", "int").unwrap();
        table.add_column("b", "string").unwrap();
        for (a, b) in [(1, "x"), (2, "y"), (3, "z")] {
            table
                .append(&[DataValue::from(a), DataValue::from(b)])
                .unwrap();
        }
        table
    }

    #[test]
    fn test_read_through() {
        let table = build_table();
        let pos_list = Arc::new(vec![RowId::new(1, 0), RowId::new(0, 0)]);
        let segment = ReferenceSegment::new(table.clone(), 1, pos_list);

        assert_eq!(segment.len(), 2);
        assert_eq!(segment.get(0).unwrap(), DataValue::from("z"));
        assert_eq!(segment.get(1).unwrap(), DataValue::from("x"));
        assert_eq!(segment.estimate_memory_usage(), 2 * size_of::<RowId>());
        assert!(segment.referenced_table().same_table(&table));
    }

    #[test]
    fn test_reads_follow_compression() {
        let table = build_table();
        let pos_list = Arc::new(vec![RowId::new(0, 1), RowId::new(1, 0)]);
        let segment = ReferenceSegment::new(table.clone(), 0, pos_list);

        table.compress_chunk(0).unwrap();
        assert_eq!(segment.get(0).unwrap(), DataValue::from(2));
        assert_eq!(segment.get(1).unwrap(), DataValue::from(3));
    }

    #[test]
    fn test_out_of_range() {
        let table = build_table();
        let segment = ReferenceSegment::new(table, 0, Arc::new(vec![RowId::new(5, 0)]));
        assert!(matches!(
            segment.get(1).unwrap_err().kind(),
            StorageError::OutOfRange { .. }
        ));
        assert!(matches!(
            segment.get(0).unwrap_err().kind(),
            StorageError::OutOfRange { .. }
        ));
    }
}

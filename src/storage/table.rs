// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{
    Chunk, Segment, StorageError, StorageResult, TableOptions, TracedStorageError,
    ValueSegmentImpl,
};
use crate::types::{ChunkId, ChunkOffset, ColumnId, DataTypeKind, DataValue, RowId, TypeResolver};

/// A table, split horizontally into chunks.
///
/// This struct can be freely cloned, as it only serves as a handle to the
/// table. All clones observe the same chunks.
#[derive(Clone)]
pub struct Table {
    inner: Arc<RwLock<TableInner>>,
    resolver: Arc<TypeResolver>,
}

struct TableInner {
    chunks: Vec<Chunk>,
    column_names: Vec<String>,
    /// Type tags as given by the user.
    column_types: Vec<String>,
    column_kinds: Vec<DataTypeKind>,
    target_chunk_size: ChunkOffset,
}

impl TableInner {
    fn column_index(&self, column_id: ColumnId) -> StorageResult<usize> {
        let idx = column_id as usize;
        if idx < self.column_names.len() {
            Ok(idx)
        } else {
            Err(TracedStorageError::out_of_range(
                "column",
                column_id,
                self.column_names.len(),
            ))
        }
    }

    fn chunk(&self, chunk_id: ChunkId) -> StorageResult<&Chunk> {
        self.chunks
            .get(chunk_id as usize)
            .ok_or_else(|| TracedStorageError::out_of_range("chunk", chunk_id, self.chunks.len()))
    }

    /// A chunk with an empty value segment for every column.
    fn new_chunk(&self) -> Chunk {
        self.column_kinds
            .iter()
            .map(|&kind| Segment::Value(ValueSegmentImpl::new(kind)))
            .collect()
    }

    /// Whether the schema may still get columns with segments.
    fn is_pristine(&self) -> bool {
        self.chunks.len() == 1 && self.chunks[0].is_empty()
    }

    /// Derived tables only hold reference segments and never take rows.
    fn check_mutable(&self) -> StorageResult<()> {
        if self.chunks.iter().any(Chunk::has_references) {
            return Err(TracedStorageError::immutable("reference"));
        }
        Ok(())
    }
}

impl Table {
    /// Create an empty table whose chunks hold up to `target_chunk_size` rows.
    pub fn new(target_chunk_size: ChunkOffset) -> Self {
        Self::with_options(TableOptions::with_chunk_size(target_chunk_size))
    }

    pub fn with_options(options: TableOptions) -> Self {
        Self::with_resolver(options, Arc::new(TypeResolver::new()))
    }

    /// Create an empty table resolving column type tags with `resolver`.
    pub fn with_resolver(options: TableOptions, resolver: Arc<TypeResolver>) -> Self {
        let options = options.sanitized();
        let inner = TableInner {
            chunks: vec![Chunk::new()],
            column_names: vec![],
            column_types: vec![],
            column_kinds: vec![],
            target_chunk_size: options.target_chunk_size,
        };
        Table {
            inner: Arc::new(RwLock::new(inner)),
            resolver,
        }
    }

    /// Record a column in the schema without creating its segments.
    ///
    /// Tables built this way get their chunks through [`Table::emplace_chunk`].
    pub fn add_column_definition(
        &self,
        name: impl Into<String>,
        type_tag: impl Into<String>,
    ) -> StorageResult<()> {
        let mut inner = self.inner.write();
        self.define_column(&mut inner, name.into(), type_tag.into())?;
        Ok(())
    }

    /// Add a column to a table that holds no rows yet.
    pub fn add_column(
        &self,
        name: impl Into<String>,
        type_tag: impl Into<String>,
    ) -> StorageResult<()> {
        let name = name.into();
        let mut inner = self.inner.write();
        inner.check_mutable()?;
        if !inner.is_pristine() {
            return Err(StorageError::SchemaLocked(name).into());
        }
        let kind = self.define_column(&mut inner, name, type_tag.into())?;
        inner.chunks[0].add_segment(ValueSegmentImpl::new(kind));
        Ok(())
    }

    fn define_column(
        &self,
        inner: &mut TableInner,
        name: String,
        type_tag: String,
    ) -> StorageResult<DataTypeKind> {
        let kind = self.resolver.kind_of(&type_tag)?;
        if inner.column_names.contains(&name) {
            return Err(TracedStorageError::duplicated("column", name));
        }
        inner.column_names.push(name);
        inner.column_types.push(type_tag);
        inner.column_kinds.push(kind);
        Ok(kind)
    }

    /// Append one row. A new chunk is opened when the last one is full.
    ///
    /// Fails with [`StorageError::ImmutableSegment`] on derived tables and
    /// when the last chunk has been compressed before it was full.
    pub fn append(&self, row: &[DataValue]) -> StorageResult<()> {
        let mut inner = self.inner.write();
        inner.check_mutable()?;
        if row.len() != inner.column_names.len() {
            return Err(StorageError::ArityMismatch {
                expected: inner.column_names.len(),
                actual: row.len(),
            }
            .into());
        }
        let target = inner.target_chunk_size as usize;
        if let Some(chunk) = inner.chunks.last_mut().filter(|c| c.len() < target) {
            return chunk.append(row);
        }
        let mut chunk = inner.new_chunk();
        chunk.append(row)?;
        inner.chunks.push(chunk);
        debug!(chunk_id = inner.chunks.len() - 1, "opened new chunk");
        Ok(())
    }

    /// Replace a chunk by its dictionary-encoded version.
    pub fn compress_chunk(&self, chunk_id: ChunkId) -> StorageResult<()> {
        let mut inner = self.inner.write();
        let compressed = inner.chunk(chunk_id)?.compress()?;
        debug!(
            chunk_id,
            rows = compressed.len(),
            bytes = compressed.estimate_memory_usage(),
            "compressed chunk"
        );
        inner.chunks[chunk_id as usize] = compressed;
        Ok(())
    }

    /// Add a fully built chunk.
    ///
    /// The chunk replaces the initial chunk if that one has no segments.
    pub fn emplace_chunk(&self, chunk: Chunk) -> StorageResult<()> {
        let mut inner = self.inner.write();
        if chunk.column_count() != inner.column_names.len() {
            return Err(StorageError::ArityMismatch {
                expected: inner.column_names.len(),
                actual: chunk.column_count(),
            }
            .into());
        }
        if inner.chunks.len() == 1 && inner.chunks[0].column_count() == 0 {
            inner.chunks[0] = chunk;
        } else {
            inner.chunks.push(chunk);
        }
        Ok(())
    }

    /// Read one value. Segments are looked up anew on every call.
    pub fn get_value(&self, column_id: ColumnId, row_id: RowId) -> StorageResult<DataValue> {
        let inner = self.inner.read();
        inner
            .chunk(row_id.chunk_id)?
            .get_segment(column_id)?
            .get(row_id.chunk_offset)
    }

    /// Returns a copy of a chunk. Segments share their data with the table.
    pub fn get_chunk(&self, chunk_id: ChunkId) -> StorageResult<Chunk> {
        self.with_chunk(chunk_id, Chunk::clone)
    }

    /// Run `f` on a chunk while holding the read lock.
    pub fn with_chunk<R>(
        &self,
        chunk_id: ChunkId,
        f: impl FnOnce(&Chunk) -> R,
    ) -> StorageResult<R> {
        let inner = self.inner.read();
        Ok(f(inner.chunk(chunk_id)?))
    }

    pub fn column_count(&self) -> usize {
        self.inner.read().column_names.len()
    }

    pub fn row_count(&self) -> u64 {
        let inner = self.inner.read();
        inner.chunks.iter().map(|c| c.len() as u64).sum()
    }

    pub fn chunk_count(&self) -> ChunkId {
        self.inner.read().chunks.len() as ChunkId
    }

    pub fn target_chunk_size(&self) -> ChunkOffset {
        self.inner.read().target_chunk_size
    }

    pub fn column_id_by_name(&self, name: &str) -> StorageResult<ColumnId> {
        let inner = self.inner.read();
        inner
            .column_names
            .iter()
            .position(|n| n == name)
            .map(|idx| idx as ColumnId)
            .ok_or_else(|| TracedStorageError::not_found("column", name))
    }

    pub fn column_names(&self) -> Vec<String> {
        self.inner.read().column_names.clone()
    }

    pub fn column_types(&self) -> Vec<String> {
        self.inner.read().column_types.clone()
    }

    pub fn column_name(&self, column_id: ColumnId) -> StorageResult<String> {
        let inner = self.inner.read();
        let idx = inner.column_index(column_id)?;
        Ok(inner.column_names[idx].clone())
    }

    /// The type tag the column was declared with.
    pub fn column_type(&self, column_id: ColumnId) -> StorageResult<String> {
        let inner = self.inner.read();
        let idx = inner.column_index(column_id)?;
        Ok(inner.column_types[idx].clone())
    }

    pub fn column_kind(&self, column_id: ColumnId) -> StorageResult<DataTypeKind> {
        let inner = self.inner.read();
        let idx = inner.column_index(column_id)?;
        Ok(inner.column_kinds[idx])
    }

    pub fn resolver(&self) -> &Arc<TypeResolver> {
        &self.resolver
    }

    /// Whether both handles point to the same table.
    pub fn same_table(&self, other: &Table) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn estimate_memory_usage(&self) -> usize {
        let inner = self.inner.read();
        inner.chunks.iter().map(|c| c.estimate_memory_usage()).sum()
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Table")
            .field("columns", &inner.column_names)
            .field("types", &inner.column_types)
            .field("chunks", &inner.chunks.len())
            .field("target_chunk_size", &inner.target_chunk_size)
            .finish()
    }
}

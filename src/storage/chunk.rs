// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use smallvec::SmallVec;

use super::{Segment, StorageError, StorageResult, TracedStorageError};
use crate::types::{ColumnId, DataValue};

/// A horizontal partition of a table: one segment per column, all segments
/// of equal length.
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    segments: SmallVec<[Segment; 16]>,
}

impl FromIterator<Segment> for Chunk {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        let segments: SmallVec<[Segment; 16]> = iter.into_iter().collect();
        if let Some(first) = segments.first() {
            assert!(
                segments.iter().all(|s| s.len() == first.len()),
                "all segments must have the same length"
            );
        }
        Chunk { segments }
    }
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column's segment.
    pub fn add_segment(&mut self, segment: impl Into<Segment>) {
        let segment = segment.into();
        debug_assert!(
            self.segments.is_empty() || segment.len() == self.len(),
            "all segments must have the same length"
        );
        self.segments.push(segment);
    }

    /// Append one row. Either every segment receives its value or none does.
    pub fn append(&mut self, row: &[DataValue]) -> StorageResult<()> {
        if row.len() != self.segments.len() {
            return Err(StorageError::ArityMismatch {
                expected: self.segments.len(),
                actual: row.len(),
            }
            .into());
        }
        let len = self.len();
        for (idx, (segment, value)) in self.segments.iter_mut().zip(row).enumerate() {
            if let Err(e) = segment.append(value) {
                self.rollback(idx, len);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Cut the first `count` segments back to `len` rows.
    fn rollback(&mut self, count: usize, len: usize) {
        for segment in &mut self.segments[..count] {
            if let Segment::Value(s) = segment {
                s.truncate(len);
            }
        }
    }

    pub fn get_segment(&self, column_id: ColumnId) -> StorageResult<&Segment> {
        self.segments
            .get(column_id as usize)
            .ok_or_else(|| TracedStorageError::out_of_range("column", column_id, self.column_count()))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn column_count(&self) -> usize {
        self.segments.len()
    }

    /// Return the number of rows in the chunk.
    pub fn len(&self) -> usize {
        self.segments.first().map_or(0, |s| s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the chunk belongs to a derived table.
    pub fn has_references(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Reference(_)))
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.segments.iter().map(|s| s.estimate_memory_usage()).sum()
    }

    /// Build a copy of this chunk with every value segment dictionary-encoded.
    ///
    /// Dictionary segments are shared with the copy. Reference segments can
    /// not be encoded.
    pub fn compress(&self) -> StorageResult<Chunk> {
        let segments = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Value(s) => Ok(Segment::Dictionary(s.encode())),
                Segment::Dictionary(_) => Ok(segment.clone()),
                Segment::Reference(_) => Err(TracedStorageError::unsupported_segment(
                    "reference segments can not be dictionary-encoded",
                )),
            })
            .collect::<StorageResult<SmallVec<[Segment; 16]>>>()?;
        Ok(Chunk { segments })
    }
}

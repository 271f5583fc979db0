// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::mem::size_of;

use crate::storage::{StorageResult, TracedStorageError};
use crate::types::{ChunkOffset, DataValue, NativeType};

/// An appendable segment storing its values verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSegment<T: NativeType> {
    values: Vec<T>,
}

impl<T: NativeType> Default for ValueSegment<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Enable `collect()` a segment from iterator of `T`.
impl<T: NativeType> FromIterator<T> for ValueSegment<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        ValueSegment {
            values: iter.into_iter().collect(),
        }
    }
}

impl<T: NativeType> ValueSegment<T> {
    pub fn new() -> Self {
        ValueSegment { values: vec![] }
    }

    pub fn get(&self, offset: ChunkOffset) -> StorageResult<&T> {
        self.values
            .get(offset as usize)
            .ok_or_else(|| TracedStorageError::out_of_range("value segment", offset, self.len()))
    }

    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }

    /// Append a scalar, casting it to `T` first.
    pub fn append(&mut self, value: &DataValue) -> StorageResult<()> {
        self.values.push(value.cast::<T>()?);
        Ok(())
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Counts the inline size of the values only. Heap data owned by a value,
    /// like the bytes of a `String`, is not included.
    pub fn estimate_memory_usage(&self) -> usize {
        self.values.len() * size_of::<T>()
    }
}

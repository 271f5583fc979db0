// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::mem::size_of;
use std::sync::Arc;

use super::{AttributeVector, CodeWidth, ValueId, ValueSegment, INVALID_VALUE_ID};
use crate::storage::{encode_dictionary, StorageResult, TracedStorageError};
use crate::types::{ChunkOffset, NativeType};

/// An immutable, dictionary-encoded segment.
///
/// The dictionary is strictly ascending, and the code of a row is the index
/// of its value inside the dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionarySegment<T: NativeType> {
    dictionary: Arc<Vec<T>>,
    attribute_vector: Arc<AttributeVector>,
}

impl<T: NativeType> DictionarySegment<T> {
    pub(crate) fn from_parts(dictionary: Vec<T>, attribute_vector: AttributeVector) -> Self {
        debug_assert!(
            dictionary.windows(2).all(|w| w[0] < w[1]),
            "dictionary must be strictly ascending"
        );
        DictionarySegment {
            dictionary: Arc::new(dictionary),
            attribute_vector: Arc::new(attribute_vector),
        }
    }

    /// Creates a dictionary segment from the values of `segment`.
    pub fn encode(segment: &ValueSegment<T>) -> Self {
        encode_dictionary(segment)
    }

    /// Decode the value at `offset`.
    pub fn get(&self, offset: ChunkOffset) -> StorageResult<&T> {
        let value_id = self.value_id(offset)?;
        self.value_by_value_id(value_id)
    }

    /// The code stored at `offset`.
    pub fn value_id(&self, offset: ChunkOffset) -> StorageResult<ValueId> {
        self.attribute_vector
            .get(offset as usize)
            .ok_or_else(|| TracedStorageError::out_of_range("dictionary segment", offset, self.len()))
    }

    pub fn value_by_value_id(&self, value_id: ValueId) -> StorageResult<&T> {
        usize::try_from(value_id)
            .ok()
            .and_then(|idx| self.dictionary.get(idx))
            .ok_or_else(|| {
                TracedStorageError::out_of_range("dictionary", value_id, self.dictionary.len())
            })
    }

    /// Returns the first value id that refers to a value >= `value`, or
    /// [`INVALID_VALUE_ID`] if all values are smaller.
    pub fn lower_bound(&self, value: &T) -> ValueId {
        let idx = self.dictionary.partition_point(|v| v < value);
        self.to_value_id(idx)
    }

    /// Returns the first value id that refers to a value > `value`, or
    /// [`INVALID_VALUE_ID`] if all values are smaller or equal.
    pub fn upper_bound(&self, value: &T) -> ValueId {
        let idx = self.dictionary.partition_point(|v| v <= value);
        self.to_value_id(idx)
    }

    fn to_value_id(&self, idx: usize) -> ValueId {
        if idx == self.dictionary.len() {
            INVALID_VALUE_ID
        } else {
            idx as ValueId
        }
    }

    pub fn dictionary(&self) -> &Arc<Vec<T>> {
        &self.dictionary
    }

    pub fn attribute_vector(&self) -> &AttributeVector {
        &self.attribute_vector
    }

    pub fn code_width(&self) -> CodeWidth {
        self.attribute_vector.width()
    }

    pub fn unique_values_count(&self) -> usize {
        self.dictionary.len()
    }

    pub fn len(&self) -> usize {
        self.attribute_vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attribute_vector.is_empty()
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.dictionary.len() * size_of::<T>() + self.attribute_vector.estimate_memory_usage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn even_numbers() -> DictionarySegment<i32> {
        let segment: ValueSegment<i32> = (0..=10).step_by(2).collect();
        DictionarySegment::encode(&segment)
    }

    #[test]
    fn test_lower_upper_bound() {
        let segment = even_numbers();

        assert_eq!(segment.lower_bound(&4), 2);
        assert_eq!(segment.upper_bound(&4), 3);

        assert_eq!(segment.lower_bound(&5), 3);
        assert_eq!(segment.upper_bound(&5), 3);

        assert_eq!(segment.lower_bound(&-1), 0);
        assert_eq!(segment.lower_bound(&15), INVALID_VALUE_ID);
        assert_eq!(segment.upper_bound(&10), INVALID_VALUE_ID);
        assert_eq!(segment.upper_bound(&15), INVALID_VALUE_ID);
    }

    #[test]
    fn test_memory_usage() {
        let mut values: ValueSegment<i32> = (0..=10).step_by(2).collect();
        values.push(10);
        values.push(10);
        let segment = DictionarySegment::encode(&values);

        // values:                  0, 2, 4, 6, 8, 10, 10, 10
        // dictionary size:         6 * sizeof(i32)
        // attribute vector size:   8 * sizeof(u8)
        assert_eq!(
            segment.estimate_memory_usage(),
            6 * size_of::<i32>() + 8 * size_of::<u8>()
        );
    }

    #[test]
    fn test_get() {
        let values: ValueSegment<String> = ["World", "Hallo", "World"]
            .into_iter()
            .map(String::from)
            .collect();
        let segment = DictionarySegment::encode(&values);
        assert_eq!(segment.get(1).unwrap(), "Hallo");
        assert_eq!(segment.value_id(0).unwrap(), 1);
        assert!(segment.get(3).is_err());
        assert!(segment.value_by_value_id(2).is_err());
        assert!(segment.value_by_value_id(INVALID_VALUE_ID).is_err());
    }
}

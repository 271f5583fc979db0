// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

//! Dictionary encoding of value segments.

use itertools::Itertools;

use super::{AttributeVector, CodeWidth, DictionarySegment, ValueId, ValueSegment};
use crate::types::NativeType;

/// Returns the narrowest code width able to address `distinct_count` values.
///
/// The all-ones code of every width is reserved as "not found", so a width of
/// `w` bits holds at most `2^w - 1` distinct values.
pub fn minimal_code_width(distinct_count: u64) -> CodeWidth {
    [CodeWidth::W8, CodeWidth::W16, CodeWidth::W32]
        .into_iter()
        .find(|width| distinct_count <= width.capacity())
        .unwrap_or(CodeWidth::W64)
}

/// Encodes `segment` into a [`DictionarySegment`].
///
/// The dictionary holds the distinct values in ascending order, and every row
/// is replaced by the rank of its value in the dictionary.
pub fn encode_dictionary<T: NativeType>(segment: &ValueSegment<T>) -> DictionarySegment<T> {
    let values = segment.values();
    let dictionary = values.iter().sorted().dedup().cloned().collect_vec();

    let width = minimal_code_width(dictionary.len() as u64);
    let mut attribute_vector = AttributeVector::with_capacity(width, values.len());
    for value in values {
        // every value is in the dictionary
        let idx = dictionary.binary_search(value).unwrap_or_else(|idx| idx);
        attribute_vector.push(idx as ValueId);
    }

    DictionarySegment::from_parts(dictionary, attribute_vector)
}

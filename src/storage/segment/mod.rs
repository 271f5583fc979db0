// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use super::{StorageResult, TracedStorageError};
use crate::types::{ChunkOffset, DataTypeKind, DataValue};

mod attribute_vector;
mod dictionary_segment;
mod reference_segment;
mod value_segment;

pub use self::attribute_vector::*;
pub use self::dictionary_segment::*;
pub use self::reference_segment::*;
pub use self::value_segment::*;

/// One column's data inside one chunk.
///
/// The set of variants is closed: every consumer matches on all of them.
#[derive(Debug, Clone)]
pub enum Segment {
    Value(ValueSegmentImpl),
    Dictionary(DictionarySegmentImpl),
    Reference(ReferenceSegment),
}

macro_rules! impl_typed_segments {
    ([], $( { $Variant:ident, $Type:ty } ),*) => {
        /// Embeds a [`ValueSegment`] of every supported type.
        #[derive(Debug, Clone, PartialEq)]
        pub enum ValueSegmentImpl {
            $( $Variant(ValueSegment<$Type>), )*
        }

        /// Embeds a [`DictionarySegment`] of every supported type.
        #[derive(Debug, Clone, PartialEq)]
        pub enum DictionarySegmentImpl {
            $( $Variant(DictionarySegment<$Type>), )*
        }

        $(
            impl From<ValueSegment<$Type>> for ValueSegmentImpl {
                fn from(segment: ValueSegment<$Type>) -> Self {
                    Self::$Variant(segment)
                }
            }

            impl From<DictionarySegment<$Type>> for DictionarySegmentImpl {
                fn from(segment: DictionarySegment<$Type>) -> Self {
                    Self::$Variant(segment)
                }
            }

            impl From<ValueSegment<$Type>> for Segment {
                fn from(segment: ValueSegment<$Type>) -> Self {
                    Self::Value(segment.into())
                }
            }

            impl From<DictionarySegment<$Type>> for Segment {
                fn from(segment: DictionarySegment<$Type>) -> Self {
                    Self::Dictionary(segment.into())
                }
            }
        )*

        impl ValueSegmentImpl {
            /// Create an empty segment of the given type.
            pub fn new(ty: DataTypeKind) -> Self {
                match ty {
                    $( DataTypeKind::$Variant => Self::$Variant(ValueSegment::new()), )*
                }
            }

            pub fn data_type(&self) -> DataTypeKind {
                match self {
                    $( Self::$Variant(_) => DataTypeKind::$Variant, )*
                }
            }

            pub fn get(&self, offset: ChunkOffset) -> StorageResult<DataValue> {
                match self {
                    $( Self::$Variant(s) => Ok(DataValue::$Variant(s.get(offset)?.clone())), )*
                }
            }

            pub fn append(&mut self, value: &DataValue) -> StorageResult<()> {
                match self {
                    $( Self::$Variant(s) => s.append(value), )*
                }
            }

            pub(crate) fn truncate(&mut self, len: usize) {
                match self {
                    $( Self::$Variant(s) => s.truncate(len), )*
                }
            }

            pub fn len(&self) -> usize {
                match self {
                    $( Self::$Variant(s) => s.len(), )*
                }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            pub fn estimate_memory_usage(&self) -> usize {
                match self {
                    $( Self::$Variant(s) => s.estimate_memory_usage(), )*
                }
            }

            /// Build the dictionary-encoded equivalent of this segment.
            pub fn encode(&self) -> DictionarySegmentImpl {
                match self {
                    $( Self::$Variant(s) => DictionarySegmentImpl::$Variant(DictionarySegment::encode(s)), )*
                }
            }
        }

        impl DictionarySegmentImpl {
            pub fn data_type(&self) -> DataTypeKind {
                match self {
                    $( Self::$Variant(_) => DataTypeKind::$Variant, )*
                }
            }

            pub fn get(&self, offset: ChunkOffset) -> StorageResult<DataValue> {
                match self {
                    $( Self::$Variant(s) => Ok(DataValue::$Variant(s.get(offset)?.clone())), )*
                }
            }

            pub fn len(&self) -> usize {
                match self {
                    $( Self::$Variant(s) => s.len(), )*
                }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            pub fn unique_values_count(&self) -> usize {
                match self {
                    $( Self::$Variant(s) => s.unique_values_count(), )*
                }
            }

            pub fn attribute_vector(&self) -> &AttributeVector {
                match self {
                    $( Self::$Variant(s) => s.attribute_vector(), )*
                }
            }

            pub fn estimate_memory_usage(&self) -> usize {
                match self {
                    $( Self::$Variant(s) => s.estimate_memory_usage(), )*
                }
            }
        }
    };
}

crate::for_all_types! { impl_typed_segments }

impl From<ValueSegmentImpl> for Segment {
    fn from(segment: ValueSegmentImpl) -> Self {
        Self::Value(segment)
    }
}

impl From<DictionarySegmentImpl> for Segment {
    fn from(segment: DictionarySegmentImpl) -> Self {
        Self::Dictionary(segment)
    }
}

impl From<ReferenceSegment> for Segment {
    fn from(segment: ReferenceSegment) -> Self {
        Self::Reference(segment)
    }
}

impl Segment {
    /// Read the value at `offset`.
    pub fn get(&self, offset: ChunkOffset) -> StorageResult<DataValue> {
        match self {
            Self::Value(s) => s.get(offset),
            Self::Dictionary(s) => s.get(offset),
            Self::Reference(s) => s.get(offset),
        }
    }

    /// Append a value. Only value segments accept new rows.
    pub fn append(&mut self, value: &DataValue) -> StorageResult<()> {
        match self {
            Self::Value(s) => s.append(value),
            Self::Dictionary(_) | Self::Reference(_) => {
                Err(TracedStorageError::immutable(self.name()))
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Value(s) => s.len(),
            Self::Dictionary(s) => s.len(),
            Self::Reference(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn estimate_memory_usage(&self) -> usize {
        match self {
            Self::Value(s) => s.estimate_memory_usage(),
            Self::Dictionary(s) => s.estimate_memory_usage(),
            Self::Reference(s) => s.estimate_memory_usage(),
        }
    }

    /// Name of the variant, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Dictionary(_) => "dictionary",
            Self::Reference(_) => "reference",
        }
    }

    pub fn as_reference(&self) -> Option<&ReferenceSegment> {
        match self {
            Self::Reference(s) => Some(s),
            _ => None,
        }
    }
}

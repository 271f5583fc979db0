// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::fmt::Debug;

use super::*;
use crate::storage::{DictionarySegment, DictionarySegmentImpl, ValueSegment, ValueSegmentImpl};

/// A concrete value type a column can be instantiated with.
///
/// Besides the conversions from and into [`DataValue`], the trait knows how to
/// pick its own variant out of the typed segment enums, which lets generic scan
/// code work on `ValueSegment<T>` and `DictionarySegment<T>` directly.
pub trait NativeType:
    for<'a> TryFrom<&'a DataValue, Error = ConvertError>
    + Into<DataValue>
    + Ord
    + Clone
    + Debug
    + Send
    + Sync
    + 'static
{
    /// The column type this native type belongs to.
    const KIND: DataTypeKind;

    fn as_value_segment(segment: &ValueSegmentImpl) -> Option<&ValueSegment<Self>>;

    fn as_dictionary_segment(segment: &DictionarySegmentImpl) -> Option<&DictionarySegment<Self>>;
}

macro_rules! impl_native {
    ([], $( { $Variant:ident, $Type:ty } ),*) => {
        $(
            impl NativeType for $Type {
                const KIND: DataTypeKind = DataTypeKind::$Variant;

                fn as_value_segment(segment: &ValueSegmentImpl) -> Option<&ValueSegment<Self>> {
                    match segment {
                        ValueSegmentImpl::$Variant(s) => Some(s),
                        _ => None,
                    }
                }

                fn as_dictionary_segment(
                    segment: &DictionarySegmentImpl,
                ) -> Option<&DictionarySegment<Self>> {
                    match segment {
                        DictionarySegmentImpl::$Variant(s) => Some(s),
                        _ => None,
                    }
                }
            }
        )*
    };
}

crate::for_all_types! { impl_native }

// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use parse_display::Display;

/// Index of a value inside a dictionary.
pub type ValueId = u64;

/// Returned by dictionary lookups when no entry qualifies. Codes narrower than
/// 64 bits reserve their own all-ones value, so no stored code ever equals
/// the sentinel after widening.
pub const INVALID_VALUE_ID: ValueId = ValueId::MAX;

/// Width of the codes stored in an [`AttributeVector`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CodeWidth {
    #[display("8")]
    W8,
    #[display("16")]
    W16,
    #[display("32")]
    W32,
    #[display("64")]
    W64,
}

impl CodeWidth {
    pub const fn bits(self) -> u32 {
        match self {
            Self::W8 => u8::BITS,
            Self::W16 => u16::BITS,
            Self::W32 => u32::BITS,
            Self::W64 => u64::BITS,
        }
    }

    pub const fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// The all-ones value of this width, reserved as "not found".
    pub const fn sentinel(self) -> ValueId {
        match self {
            Self::W8 => u8::MAX as ValueId,
            Self::W16 => u16::MAX as ValueId,
            Self::W32 => u32::MAX as ValueId,
            Self::W64 => u64::MAX,
        }
    }

    /// Number of distinct values a dictionary may hold with this width.
    pub const fn capacity(self) -> u64 {
        self.sentinel()
    }
}

/// Fixed-width per-row codes of a dictionary segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeVector {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
}

macro_rules! dispatch {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            AttributeVector::U8($v) => $body,
            AttributeVector::U16($v) => $body,
            AttributeVector::U32($v) => $body,
            AttributeVector::U64($v) => $body,
        }
    };
}

impl AttributeVector {
    pub fn with_capacity(width: CodeWidth, capacity: usize) -> Self {
        match width {
            CodeWidth::W8 => Self::U8(Vec::with_capacity(capacity)),
            CodeWidth::W16 => Self::U16(Vec::with_capacity(capacity)),
            CodeWidth::W32 => Self::U32(Vec::with_capacity(capacity)),
            CodeWidth::W64 => Self::U64(Vec::with_capacity(capacity)),
        }
    }

    pub fn width(&self) -> CodeWidth {
        match self {
            Self::U8(_) => CodeWidth::W8,
            Self::U16(_) => CodeWidth::W16,
            Self::U32(_) => CodeWidth::W32,
            Self::U64(_) => CodeWidth::W64,
        }
    }

    /// Append a code. The code must be below the sentinel of this width.
    pub fn push(&mut self, value_id: ValueId) {
        debug_assert!(value_id < self.width().sentinel(), "code {value_id} overflows");
        match self {
            Self::U8(v) => v.push(value_id as u8),
            Self::U16(v) => v.push(value_id as u16),
            Self::U32(v) => v.push(value_id as u32),
            Self::U64(v) => v.push(value_id),
        }
    }

    pub fn get(&self, idx: usize) -> Option<ValueId> {
        dispatch!(self, v => v.get(idx).map(|&id| id as ValueId))
    }

    pub fn len(&self) -> usize {
        dispatch!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> AttributeVectorIter<'_> {
        AttributeVectorIter {
            data: self,
            pos: 0,
        }
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.len() * self.width().bytes()
    }
}

/// An iterator over the codes of an [`AttributeVector`], widened to [`ValueId`].
#[derive(Clone)]
pub struct AttributeVectorIter<'a> {
    data: &'a AttributeVector,
    pos: usize,
}

impl Iterator for AttributeVectorIter<'_> {
    type Item = ValueId;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.data.get(self.pos)?;
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let exact = self.data.len() - self.pos;
        (exact, Some(exact))
    }
}

impl ExactSizeIterator for AttributeVectorIter<'_> {}

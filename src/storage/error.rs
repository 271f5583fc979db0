// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use std::backtrace::Backtrace;

use thiserror::Error;

use crate::types::ConvertError;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{0} segment is immutable")]
    ImmutableSegment(&'static str),
    #[error("unsupported segment: {0}")]
    UnsupportedSegment(String),
    #[error("{kind} index {index} out of range (len: {len})")]
    OutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
    #[error("tuple length mismatch: expected {expected} but got {actual}")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("{0}({1}) not found")]
    NotFound(&'static str, String),
    #[error("duplicated {0}: {1}")]
    Duplicated(&'static str, String),
    #[error("can not add column {0}: table already holds rows")]
    SchemaLocked(String),
    #[error("conversion error: {0}")]
    Convert(#[from] ConvertError),
}

impl From<ConvertError> for TracedStorageError {
    #[inline]
    fn from(e: ConvertError) -> TracedStorageError {
        StorageError::Convert(e).into()
    }
}

/// [`StorageError`] with the backtrace captured where it was raised.
///
/// `Error` is implemented by hand: a derived `Backtrace` field needs the
/// unstable `error_generic_member_access`.
pub struct TracedStorageError {
    source: StorageError,
    backtrace: Backtrace,
}

impl From<StorageError> for TracedStorageError {
    #[inline]
    fn from(source: StorageError) -> Self {
        TracedStorageError {
            source,
            backtrace: Backtrace::capture(),
        }
    }
}

impl std::error::Error for TracedStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl std::fmt::Display for TracedStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}\n{}", self.source, self.backtrace)
    }
}

impl std::fmt::Debug for TracedStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl TracedStorageError {
    /// The error without its backtrace.
    pub fn kind(&self) -> &StorageError {
        &self.source
    }

    pub fn duplicated(ty: &'static str, item: impl ToString) -> Self {
        StorageError::Duplicated(ty, item.to_string()).into()
    }

    pub fn not_found(ty: &'static str, item: impl ToString) -> Self {
        StorageError::NotFound(ty, item.to_string()).into()
    }

    pub fn out_of_range(kind: &'static str, index: impl TryInto<usize>, len: usize) -> Self {
        let index = index.try_into().unwrap_or(usize::MAX);
        StorageError::OutOfRange { kind, index, len }.into()
    }

    pub fn immutable(segment: &'static str) -> Self {
        StorageError::ImmutableSegment(segment).into()
    }

    pub fn unsupported_segment(message: impl ToString) -> Self {
        StorageError::UnsupportedSegment(message.to_string()).into()
    }
}

pub type StorageResult<T> = std::result::Result<T, TracedStorageError>;

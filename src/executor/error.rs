// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use std::sync::Arc;

use crate::storage::{StorageError, TracedStorageError};
use crate::types::ConvertError;

/// The result type of execution.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type of execution.
#[derive(thiserror::Error, Debug, Clone)]
#[error(transparent)]
pub struct Error {
    inner: Arc<Inner>,
}

#[derive(thiserror::Error, Debug)]
enum Inner {
    #[error("storage error: {0}")]
    Storage(#[from] TracedStorageError),
    #[error("conversion error: {0}")]
    Convert(#[from] ConvertError),
    #[error("unsupported comparison operator: {0}")]
    UnsupportedOperator(String),
}

impl From<Inner> for Error {
    fn from(e: Inner) -> Self {
        Error { inner: Arc::new(e) }
    }
}

impl From<TracedStorageError> for Error {
    fn from(e: TracedStorageError) -> Self {
        Inner::from(e).into()
    }
}

impl From<ConvertError> for Error {
    fn from(e: ConvertError) -> Self {
        Inner::from(e).into()
    }
}

impl Error {
    pub fn unsupported_operator(op: impl Into<String>) -> Self {
        Inner::UnsupportedOperator(op.into()).into()
    }

    /// The storage error that caused this error, if any.
    pub fn as_storage(&self) -> Option<&StorageError> {
        match &*self.inner {
            Inner::Storage(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// The conversion error that caused this error, if any.
    ///
    /// Conversion errors raised by the storage layer are included.
    pub fn as_convert(&self) -> Option<&ConvertError> {
        match &*self.inner {
            Inner::Convert(e) => Some(e),
            Inner::Storage(e) => match e.kind() {
                StorageError::Convert(e) => Some(e),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_unsupported_operator(&self) -> bool {
        matches!(&*self.inner, Inner::UnsupportedOperator(_))
    }
}

// Copyright 2022 RisingLight Project Authors. Licensed under Apache-2.0.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::ChunkOffset;

/// Number of rows a chunk holds before a new one is opened.
pub const DEFAULT_CHUNK_SIZE: ChunkOffset = 65535;

/// Options for a [`Table`](super::Table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Target number of rows per chunk
    pub target_chunk_size: ChunkOffset,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            target_chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl TableOptions {
    pub fn with_chunk_size(target_chunk_size: ChunkOffset) -> Self {
        Self { target_chunk_size }
    }

    pub fn default_for_test() -> Self {
        Self {
            target_chunk_size: 4,
        }
    }

    /// Fix up values that would make a table unusable.
    pub(super) fn sanitized(self) -> Self {
        if self.target_chunk_size == 0 {
            warn!("target chunk size 0 is not allowed, using 1 instead");
            return Self {
                target_chunk_size: 1,
            };
        }
        self
    }
}

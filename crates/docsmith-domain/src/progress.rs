//! Transient progress events emitted during a parse run

use serde::{Deserialize, Serialize};

/// Progress of a chunked parse run
///
/// Emitted exactly once per chunk, before that chunk's processing begins.
/// `current` is 0-based and strictly increasing within a run; `total >= 1`
/// always (an unchunked document still counts as one chunk). Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseProgress {
    /// 0-based index of the chunk about to be processed
    pub current: usize,

    /// Total number of chunks in this run
    pub total: usize,

    /// Section label of the chunk, when the document was split
    #[serde(default)]
    pub chunk_label: Option<String>,
}

impl ParseProgress {
    /// Create a progress event
    ///
    /// # Panics
    /// Panics if the `0 <= current < total` invariant is violated.
    pub fn new(current: usize, total: usize, chunk_label: Option<String>) -> Self {
        assert!(total >= 1, "total must be >= 1");
        assert!(current < total, "current must be < total");
        Self {
            current,
            total,
            chunk_label,
        }
    }
}

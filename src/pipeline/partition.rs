//! Pure partitioning of the dataset into per-worker chunks
//!
//! Partitions the actual row count supplied by the caller; chunk boundaries
//! are deterministic, so worker *i* always receives chunk *i*.

use crate::errors::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};

/// Half-open row-index range `[start, end)` assigned to one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `total_rows` rows into `workers` contiguous, non-overlapping chunks.
///
/// Coverage is exact: the union of the returned ranges is `[0, total_rows)`.
/// Sizes are balanced; the first `total_rows % workers` chunks take one extra
/// row, so the largest and smallest chunk differ by at most one. When
/// `total_rows < workers` the trailing chunks are empty; callers skip them.
pub fn partition(total_rows: usize, workers: usize) -> PipelineResult<Vec<Chunk>> {
    if workers == 0 {
        return Err(PipelineError::invalid_config(
            "worker count must be positive",
            "workers",
            workers,
        ));
    }

    let base = total_rows / workers;
    let remainder = total_rows % workers;

    let mut chunks = Vec::with_capacity(workers);
    let mut start = 0;
    for i in 0..workers {
        let size = base + usize::from(i < remainder);
        chunks.push(Chunk {
            start,
            end: start + size,
        });
        start += size;
    }

    debug_assert_eq!(start, total_rows);
    Ok(chunks)
}

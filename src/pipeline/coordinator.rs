//! Dispatch and collection of the map phase
//!
//! The coordinator owns the full dataset and the chunk list. It spawns one
//! task per non-empty chunk with shared read-only access to the rows, then
//! joins every task in ascending worker order before handing the ordered
//! partials to the reduce phase. The join is a barrier: no partial result is
//! consumed before every worker has finished, and any worker failure aborts
//! the whole run.

use crate::config::RunConfig;
use crate::dataset::Dataset;
use crate::errors::{PipelineError, PipelineResult};
use crate::pipeline::aggregate::{self, FinalAggregate};
use crate::pipeline::partition::{partition, Chunk};
use crate::pipeline::worker::{self, PartialResult};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

/// Summary of one completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub aggregate: FinalAggregate,
    /// Data rows the map phase consumed
    pub rows: usize,
    /// Workers that received a non-empty chunk
    pub workers_spawned: usize,
    pub elapsed_ms: u64,
}

type WorkerHandle = (usize, Chunk, JoinHandle<PipelineResult<PartialResult>>);

/// Run the map phase over `dataset` and reduce the partials.
///
/// Chunk assignment is deterministic (worker *i* gets chunk *i*) and the
/// partials are collected in worker order, so the merged totals are
/// reproducible across runs regardless of execution interleaving.
pub async fn execute(config: &RunConfig, dataset: &Dataset) -> PipelineResult<RunReport> {
    let started = Instant::now();
    let chunks = partition(dataset.len(), config.workers)?;

    let rows = Arc::clone(&dataset.rows);
    let schema = dataset.schema;

    let mut spawned: Vec<WorkerHandle> = Vec::with_capacity(chunks.len());
    for (worker_id, chunk) in chunks.into_iter().enumerate() {
        if chunk.is_empty() {
            debug!(worker_id, "skipping empty chunk");
            continue;
        }
        let rows = Arc::clone(&rows);
        let handle =
            tokio::spawn(async move { worker::run_chunk(worker_id, chunk, &rows, &schema) });
        spawned.push((worker_id, chunk, handle));
    }

    info!(
        workers = spawned.len(),
        rows = dataset.len(),
        "map phase started"
    );

    let partials = collect(spawned, config.worker_timeout_secs).await?;

    info!(workers = partials.len(), "map phase complete, reducing");
    let aggregate = aggregate::merge(&partials);
    if aggregate.skipped > 0 {
        warn!(
            skipped = aggregate.skipped,
            "malformed rows were dropped during the map phase"
        );
    }

    Ok(RunReport {
        rows: dataset.len(),
        workers_spawned: partials.len(),
        elapsed_ms: started.elapsed().as_millis() as u64,
        aggregate,
    })
}

/// Barrier join: await every worker in ascending order, with an optional
/// deadline covering the whole phase. Still-running tasks are aborted as soon
/// as the run is known to fail.
async fn collect(
    spawned: Vec<WorkerHandle>,
    timeout_secs: Option<u64>,
) -> PipelineResult<Vec<PartialResult>> {
    let deadline = timeout_secs.map(|s| tokio::time::Instant::now() + Duration::from_secs(s));
    let abort_handles: Vec<AbortHandle> = spawned
        .iter()
        .map(|(_, _, handle)| handle.abort_handle())
        .collect();

    let total = spawned.len();
    let mut partials = Vec::with_capacity(total);

    for (i, (worker_id, chunk, handle)) in spawned.into_iter().enumerate() {
        let joined = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    abort_from(&abort_handles, i);
                    return Err(PipelineError::WorkerTimeout {
                        timeout_secs: timeout_secs.unwrap_or(0),
                        pending_workers: total - i,
                    });
                }
            },
            None => handle.await,
        };

        match joined {
            Ok(Ok(partial)) => partials.push(partial),
            Ok(Err(err)) => {
                abort_from(&abort_handles, i + 1);
                return Err(err);
            }
            Err(join_err) => {
                abort_from(&abort_handles, i + 1);
                let reason = if join_err.is_panic() {
                    "worker task panicked".to_string()
                } else {
                    "worker task was cancelled".to_string()
                };
                return Err(PipelineError::WorkerFailed {
                    worker_id,
                    chunk_start: chunk.start,
                    chunk_end: chunk.end,
                    reason,
                });
            }
        }
    }

    Ok(partials)
}

fn abort_from(abort_handles: &[AbortHandle], from: usize) {
    for handle in &abort_handles[from..] {
        handle.abort();
    }
}

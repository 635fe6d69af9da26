//! Structured error types for the appraisal pipeline
//!
//! Provides error categorization with enough context to reproduce a
//! failure (which worker, which chunk) and enables programmatic handling
//! at the CLI boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Main error type for pipeline operations
#[derive(Debug, Error)]
pub enum PipelineError {
    // Configuration errors, detected before any work starts
    #[error("Invalid configuration: {reason} (field `{field}` = `{value}`)")]
    InvalidConfiguration {
        reason: String,
        field: String,
        value: String,
    },

    // Dataset access errors
    #[error("Failed to read dataset {path}")]
    DatasetAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse dataset {path}: {reason}")]
    DatasetFormat { path: PathBuf, reason: String },

    // Worker-level errors, fatal to the whole run
    #[error("Worker {worker_id} failed on chunk [{chunk_start}, {chunk_end}): {reason}")]
    WorkerFailed {
        worker_id: usize,
        chunk_start: usize,
        chunk_end: usize,
        reason: String,
    },

    #[error("{pending_workers} worker(s) still unjoined after the {timeout_secs}s barrier deadline")]
    WorkerTimeout {
        timeout_secs: u64,
        /// Workers the barrier had not yet joined when the deadline expired
        pending_workers: usize,
    },

    // Output errors
    #[error("Failed to write output file {path}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Helper for configuration errors
    pub fn invalid_config(
        reason: impl Into<String>,
        field: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
            field: field.into(),
            value: value.to_string(),
        }
    }
}

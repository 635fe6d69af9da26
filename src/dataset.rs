//! Dataset loading
//!
//! The input is a `;`-delimited file with one header row followed by data
//! rows. The row count comes from configuration (the dataset is never
//! pre-scanned); loading happens once, before any worker is spawned, and the
//! rows are then shared read-only across workers.

use crate::errors::{PipelineError, PipelineResult};
use crate::pipeline::record::ColumnSchema;
use csv::StringRecord;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// The loaded dataset: data rows only, header already consumed.
///
/// Rows sit behind an `Arc` so workers share them read-only without copying.
#[derive(Debug)]
pub struct Dataset {
    pub path: PathBuf,
    pub rows: Arc<Vec<StringRecord>>,
    pub schema: ColumnSchema,
}

impl Dataset {
    /// Load at most `total_rows` data rows from `path`.
    ///
    /// A file with fewer data rows than requested is tolerated (the supplied
    /// count is external and may be approximate); the pipeline then runs over
    /// the rows actually present.
    pub fn load(path: &Path, total_rows: usize, schema: ColumnSchema) -> PipelineResult<Self> {
        schema
            .validate()
            .map_err(|reason| PipelineError::invalid_config(reason, "schema", "column indices"))?;

        let file = File::open(path).map_err(|source| PipelineError::DatasetAccess {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let mut rows = Vec::with_capacity(total_rows);
        for record in reader.records() {
            if rows.len() == total_rows {
                break;
            }
            let record = record.map_err(|err| PipelineError::DatasetFormat {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
            rows.push(record);
        }

        if rows.len() < total_rows {
            warn!(
                requested = total_rows,
                loaded = rows.len(),
                "dataset has fewer data rows than requested; using the loaded count"
            );
        }
        debug!(path = %path.display(), rows = rows.len(), "dataset loaded");

        Ok(Self {
            path: path.to_path_buf(),
            rows: Arc::new(rows),
            schema,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

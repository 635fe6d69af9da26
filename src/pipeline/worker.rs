//! Map phase: one worker consuming one chunk
//!
//! A worker parses every row in its chunk, classifies recognized records into
//! per-category buckets, and accumulates the three metrics locally. Workers
//! own their [`PartialResult`] exclusively while running, so this module has
//! no locks and no shared mutable state.

use crate::errors::{PipelineError, PipelineResult};
use crate::pipeline::partition::Chunk;
use crate::pipeline::record::{self, Category, ColumnSchema};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Running totals for one category bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub appraisal_value: f64,
    pub amount_paid: f64,
    pub door_count: u64,
    pub records: u64,
}

impl CategoryTotals {
    fn add(&mut self, record: &record::VehicleRecord) {
        self.appraisal_value += record.appraisal_value;
        self.amount_paid += record.amount_paid;
        self.door_count += u64::from(record.door_count);
        self.records += 1;
    }
}

/// One worker's local aggregation over its chunk.
///
/// Created empty at worker start, mutated only by that worker, immutable once
/// handed back to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialResult {
    pub worker_id: usize,
    pub chunk: Chunk,
    /// Buckets indexed by [`Category::index`], in output-column order
    pub totals: [CategoryTotals; 3],
    /// Rows whose group label is outside the closed category set
    pub unrecognized: u64,
    /// Rows dropped as malformed
    pub skipped: u64,
}

impl PartialResult {
    fn new(worker_id: usize, chunk: Chunk) -> Self {
        Self {
            worker_id,
            chunk,
            totals: [CategoryTotals::default(); 3],
            unrecognized: 0,
            skipped: 0,
        }
    }

    pub fn totals_for(&self, category: Category) -> &CategoryTotals {
        &self.totals[category.index()]
    }
}

/// Parsed records traced per worker at the head of its chunk
const TRACE_HEAD_ROWS: usize = 5;

/// Consume exactly `rows[chunk.start..chunk.end]` and return the local totals.
///
/// Malformed rows are skipped and counted, never fatal; a chunk extending
/// past the dataset is a coordinator bug and fails the worker.
pub fn run_chunk(
    worker_id: usize,
    chunk: Chunk,
    rows: &[StringRecord],
    schema: &ColumnSchema,
) -> PipelineResult<PartialResult> {
    if chunk.end > rows.len() {
        return Err(PipelineError::WorkerFailed {
            worker_id,
            chunk_start: chunk.start,
            chunk_end: chunk.end,
            reason: format!("chunk exceeds dataset of {} row(s)", rows.len()),
        });
    }

    let mut result = PartialResult::new(worker_id, chunk);

    for (offset, row) in rows[chunk.start..chunk.end].iter().enumerate() {
        let row_index = chunk.start + offset;
        match record::parse(row, schema) {
            Ok(parsed) => {
                if offset < TRACE_HEAD_ROWS {
                    trace!(
                        worker_id,
                        row_index,
                        group = %parsed.group,
                        appraisal_value = parsed.appraisal_value,
                        amount_paid = parsed.amount_paid,
                        door_count = parsed.door_count,
                        "parsed record"
                    );
                }
                match parsed.category() {
                    Some(category) => result.totals[category.index()].add(&parsed),
                    None => {
                        trace!(worker_id, row_index, group = %parsed.group, "unrecognized group label");
                        result.unrecognized += 1;
                    }
                }
            }
            Err(err) => {
                debug!(worker_id, row_index, %err, "skipping malformed row");
                result.skipped += 1;
            }
        }
    }

    debug!(
        worker_id,
        rows = chunk.len(),
        skipped = result.skipped,
        unrecognized = result.unrecognized,
        "worker finished chunk"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::record::make_row;

    fn schema() -> ColumnSchema {
        ColumnSchema::default()
    }

    #[test]
    fn test_classification_routes_to_single_bucket() {
        let rows = vec![make_row("Vehiculo Liviano", "100", "90", "4")];
        let result = run_chunk(0, Chunk { start: 0, end: 1 }, &rows, &schema()).unwrap();

        let light = result.totals_for(Category::LightVehicle);
        assert_eq!(light.appraisal_value, 100.0);
        assert_eq!(light.amount_paid, 90.0);
        assert_eq!(light.door_count, 4);
        assert_eq!(light.records, 1);

        assert_eq!(*result.totals_for(Category::Cargo), CategoryTotals::default());
        assert_eq!(
            *result.totals_for(Category::PublicTransport),
            CategoryTotals::default()
        );
    }

    #[test]
    fn test_accumulation_within_category() {
        let rows = vec![
            make_row("Carga", "200", "150", "2"),
            make_row("Carga", "300", "250", "6"),
        ];
        let result = run_chunk(0, Chunk { start: 0, end: 2 }, &rows, &schema()).unwrap();
        let cargo = result.totals_for(Category::Cargo);
        assert_eq!(cargo.appraisal_value, 500.0);
        assert_eq!(cargo.amount_paid, 400.0);
        assert_eq!(cargo.door_count, 8);
        assert_eq!(cargo.records, 2);
    }

    #[test]
    fn test_malformed_row_skipped_not_fatal() {
        let rows = vec![
            make_row("Carga", "200", "150", "2"),
            StringRecord::from(vec!["short", "row"]),
            make_row("Carga", "100", "50", "2"),
        ];
        let result = run_chunk(0, Chunk { start: 0, end: 3 }, &rows, &schema()).unwrap();
        assert_eq!(result.skipped, 1);
        assert_eq!(result.totals_for(Category::Cargo).records, 2);
        assert_eq!(result.totals_for(Category::Cargo).appraisal_value, 300.0);
    }

    #[test]
    fn test_unrecognized_label_counted_but_excluded() {
        let rows = vec![make_row("Maquinaria Pesada", "900", "900", "2")];
        let result = run_chunk(0, Chunk { start: 0, end: 1 }, &rows, &schema()).unwrap();
        assert_eq!(result.unrecognized, 1);
        assert_eq!(result.skipped, 0);
        for category in Category::ALL {
            assert_eq!(result.totals_for(category).records, 0);
        }
    }

    #[test]
    fn test_worker_only_consumes_its_range() {
        let rows = vec![
            make_row("Carga", "1", "1", "1"),
            make_row("Carga", "10", "10", "1"),
            make_row("Carga", "100", "100", "1"),
        ];
        let result = run_chunk(1, Chunk { start: 1, end: 2 }, &rows, &schema()).unwrap();
        assert_eq!(result.totals_for(Category::Cargo).appraisal_value, 10.0);
        assert_eq!(result.totals_for(Category::Cargo).records, 1);
    }

    #[test]
    fn test_chunk_past_dataset_fails() {
        let rows = vec![make_row("Carga", "1", "1", "1")];
        let err = run_chunk(3, Chunk { start: 0, end: 5 }, &rows, &schema()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::WorkerFailed { worker_id: 3, .. }
        ));
    }

    #[test]
    fn test_empty_chunk_yields_empty_result() {
        let rows: Vec<StringRecord> = vec![];
        let result = run_chunk(0, Chunk { start: 0, end: 0 }, &rows, &schema()).unwrap();
        assert_eq!(result.skipped, 0);
        assert_eq!(result.unrecognized, 0);
        for category in Category::ALL {
            assert_eq!(*result.totals_for(category), CategoryTotals::default());
        }
    }
}

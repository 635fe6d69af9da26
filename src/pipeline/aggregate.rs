//! Reduce phase: deterministic merge of per-worker partial results
//!
//! Merging is pure and order-independent: partials are summed in ascending
//! worker order regardless of the order they arrive in, so float accumulation
//! order is fixed and repeated runs produce bit-identical output.

use crate::pipeline::record::Category;
use crate::pipeline::worker::{CategoryTotals, PartialResult};
use serde::{Deserialize, Serialize};

/// The three aggregated metrics, in output-file order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    AppraisalValue,
    AmountPaid,
    DoorCount,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::AppraisalValue, Metric::AmountPaid, Metric::DoorCount];

    /// Output file this metric is appended to (names from the original dataset tooling)
    pub fn output_file(&self) -> &'static str {
        match self {
            Metric::AppraisalValue => "tasaciones.csv",
            Metric::AmountPaid => "valor_pagado.csv",
            Metric::DoorCount => "puertas.csv",
        }
    }
}

/// Derived statistic written to the output files
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    /// Per-category sum of the metric
    #[default]
    Sum,
    /// Per-category mean of the metric
    Average,
    /// Per-category record count
    Count,
}

/// Run-wide merged totals, one bucket per category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalAggregate {
    /// Buckets indexed by [`Category::index`]
    pub totals: [CategoryTotals; 3],
    /// Malformed rows dropped across all workers
    pub skipped: u64,
    /// Rows with labels outside the closed category set
    pub unrecognized: u64,
    /// Number of partial results merged
    pub workers: usize,
}

impl FinalAggregate {
    pub fn totals_for(&self, category: Category) -> &CategoryTotals {
        &self.totals[category.index()]
    }

    /// Recognized records across all categories
    pub fn total_records(&self) -> u64 {
        self.totals.iter().map(|t| t.records).sum()
    }

    fn metric_total(&self, category: Category, metric: Metric) -> f64 {
        let totals = self.totals_for(category);
        match metric {
            Metric::AppraisalValue => totals.appraisal_value,
            Metric::AmountPaid => totals.amount_paid,
            Metric::DoorCount => totals.door_count as f64,
        }
    }

    /// Reportable value for one (category, metric) pair under a statistic
    pub fn value(&self, category: Category, metric: Metric, statistic: Statistic) -> f64 {
        let totals = self.totals_for(category);
        match statistic {
            Statistic::Sum => self.metric_total(category, metric),
            Statistic::Average => {
                if totals.records == 0 {
                    0.0
                } else {
                    self.metric_total(category, metric) / totals.records as f64
                }
            }
            Statistic::Count => totals.records as f64,
        }
    }
}

/// Merge all partial results into the final aggregate.
///
/// Invoked exactly once per run, after the coordinator's barrier.
pub fn merge(results: &[PartialResult]) -> FinalAggregate {
    // Fixed accumulation order for reproducible float totals
    let mut ordered: Vec<&PartialResult> = results.iter().collect();
    ordered.sort_by_key(|r| r.worker_id);

    let mut aggregate = FinalAggregate {
        totals: [CategoryTotals::default(); 3],
        skipped: 0,
        unrecognized: 0,
        workers: ordered.len(),
    };

    for partial in ordered {
        for category in Category::ALL {
            let bucket = &mut aggregate.totals[category.index()];
            let local = partial.totals_for(category);
            bucket.appraisal_value += local.appraisal_value;
            bucket.amount_paid += local.amount_paid;
            bucket.door_count += local.door_count;
            bucket.records += local.records;
        }
        aggregate.skipped += partial.skipped;
        aggregate.unrecognized += partial.unrecognized;
    }

    aggregate
}

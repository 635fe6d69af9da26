//! Output persistence for final aggregates
//!
//! One line per run is appended to each of three metric files
//! (`tasaciones.csv`, `valor_pagado.csv`, `puertas.csv`), formatted as
//! `<liviano>;<carga>;<transporte_publico>;` with the trailing delimiter the
//! original files carry. Writing only happens after every worker succeeded.

use crate::errors::{PipelineError, PipelineResult};
use crate::pipeline::aggregate::{FinalAggregate, Metric, Statistic};
use crate::pipeline::record::Category;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Append one line per metric file; returns the paths written
pub fn write_aggregate(
    aggregate: &FinalAggregate,
    statistic: Statistic,
    output_dir: &Path,
) -> PipelineResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(Metric::ALL.len());
    for metric in Metric::ALL {
        let path = output_dir.join(metric.output_file());
        let line = format_line(aggregate, metric, statistic);
        append_line(&path, &line)?;
        written.push(path);
    }
    info!(files = written.len(), dir = %output_dir.display(), "aggregates written");
    Ok(written)
}

/// Render one metric line in category order: liviano, carga, transporte
fn format_line(aggregate: &FinalAggregate, metric: Metric, statistic: Statistic) -> String {
    let mut line = String::new();
    for category in Category::ALL {
        let value = aggregate.value(category, metric, statistic);
        line.push_str(&format_value(metric, statistic, value));
        line.push(';');
    }
    line
}

fn format_value(metric: Metric, statistic: Statistic, value: f64) -> String {
    // Counts and door sums are integral; monetary values keep two decimals
    let integral = matches!(statistic, Statistic::Count)
        || (metric == Metric::DoorCount && !matches!(statistic, Statistic::Average));
    if integral {
        format!("{}", value as u64)
    } else {
        format!("{value:.2}")
    }
}

fn append_line(path: &Path, line: &str) -> PipelineResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| PipelineError::OutputWrite {
            path: path.to_path_buf(),
            source,
        })?;
    writeln!(file, "{line}").map_err(|source| PipelineError::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}

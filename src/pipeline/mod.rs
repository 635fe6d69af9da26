//! The map/reduce pipeline: partition, dispatch, collect, merge
//!
//! - `partition` - chunk computation over the actual row count
//! - `record` - positional row parsing and category classification
//! - `worker` - map phase, one worker per chunk
//! - `coordinator` - dispatch, barrier join, timeout
//! - `aggregate` - reduce phase, deterministic merge

pub mod aggregate;
pub mod coordinator;
pub mod partition;
pub mod record;
pub mod worker;

use crate::config::RunConfig;
use crate::dataset::Dataset;
use crate::errors::PipelineResult;
use crate::output;
use tracing::info;

pub use coordinator::RunReport;

/// Run the whole pipeline: load, map, reduce, persist.
///
/// Output files are only touched once every worker has succeeded; a failing
/// run leaves them untouched.
pub async fn run(config: &RunConfig) -> PipelineResult<RunReport> {
    config.validate()?;

    let dataset = Dataset::load(&config.input, config.total_rows, Default::default())?;
    let report = coordinator::execute(config, &dataset).await?;
    output::write_aggregate(&report.aggregate, config.statistic, &config.output_dir)?;

    info!(
        records = report.aggregate.total_records(),
        skipped = report.aggregate.skipped,
        unrecognized = report.aggregate.unrecognized,
        elapsed_ms = report.elapsed_ms,
        "run complete"
    );
    Ok(report)
}

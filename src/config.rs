//! Run configuration for the appraisal pipeline

use crate::errors::{PipelineError, PipelineResult};
use crate::pipeline::aggregate::Statistic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Path to the `;`-delimited input dataset
    pub input: PathBuf,
    /// Number of data rows to process (supplied externally, not pre-scanned)
    pub total_rows: usize,
    /// Number of parallel workers
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Timeout for the whole map phase, in seconds (None disables)
    #[serde(default = "default_worker_timeout")]
    pub worker_timeout_secs: Option<u64>,
    /// Derived statistic written to the output files
    #[serde(default)]
    pub statistic: Statistic,
    /// Directory the three metric files are appended under
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_workers() -> usize {
    5
}

fn default_worker_timeout() -> Option<u64> {
    Some(300)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl RunConfig {
    /// Validate the configuration before any worker is spawned
    pub fn validate(&self) -> PipelineResult<()> {
        if self.workers == 0 {
            return Err(PipelineError::invalid_config(
                "worker count must be positive",
                "workers",
                self.workers,
            ));
        }
        if self.total_rows == 0 {
            return Err(PipelineError::invalid_config(
                "row count must be positive",
                "rows",
                self.total_rows,
            ));
        }
        if let Some(0) = self.worker_timeout_secs {
            return Err(PipelineError::invalid_config(
                "timeout must be positive when set",
                "timeout",
                0,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> RunConfig {
        RunConfig {
            input: PathBuf::from("vehiculos.csv"),
            total_rows: 1000,
            workers: default_workers(),
            worker_timeout_secs: default_worker_timeout(),
            statistic: Statistic::default(),
            output_dir: default_output_dir(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = RunConfig {
            workers: 0,
            ..base_config()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("workers"));
    }

    #[test]
    fn test_zero_rows_rejected() {
        let config = RunConfig {
            total_rows: 0,
            ..base_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = RunConfig {
            worker_timeout_secs: Some(0),
            ..base_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_timeout_allowed() {
        let config = RunConfig {
            worker_timeout_secs: None,
            ..base_config()
        };
        assert!(config.validate().is_ok());
    }
}

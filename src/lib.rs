//! # tasador
//!
//! Parallel map/reduce aggregation over `;`-delimited vehicle appraisal
//! datasets. The dataset is split into balanced chunks, each chunk is mapped
//! by an independent worker into per-category totals, and the partials are
//! merged deterministically into three metric files.
//!
//! ## Modules
//!
//! - `config` - run configuration and validation
//! - `dataset` - dataset loading with an externally supplied row count
//! - `errors` - pipeline error taxonomy
//! - `output` - append-mode metric file writer
//! - `pipeline` - partition, map, barrier, reduce

pub mod config;
pub mod dataset;
pub mod errors;
pub mod output;
pub mod pipeline;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use replenish_core::PipelineConfig;
use replenish_simulation::SkuFailure;

use crate::pipeline::PipelineRun;

/// Counts and settings of one run, persisted next to the tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub start_date: NaiveDate,
    pub as_of: Option<NaiveDate>,
    pub n_skus: u32,
    pub n_weeks: u32,
    pub seed: u64,
    pub service_level_z: f64,
    pub rolling_window: usize,
    pub raw_records: usize,
    pub forecast_records: usize,
    pub snapshot_skus: usize,
    pub skus_to_order: usize,
    pub failed_skus: Vec<SkuFailure>,
}

impl RunSummary {
    pub fn new(config: &PipelineConfig, run: &PipelineRun) -> Self {
        Self {
            start_date: run.start_date,
            as_of: run.recommendations.as_of,
            n_skus: config.n_skus,
            n_weeks: config.n_weeks,
            seed: config.seed,
            service_level_z: config.service_level_z,
            rolling_window: config.rolling_window,
            raw_records: run.raw.len(),
            forecast_records: run.forecasts.len(),
            snapshot_skus: run.recommendations.snapshot.len(),
            skus_to_order: run.recommendations.to_order.len(),
            failed_skus: run.failures.clone(),
        }
    }
}

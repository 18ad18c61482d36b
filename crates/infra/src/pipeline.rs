use chrono::NaiveDate;
use tracing::{info, info_span};

use replenish_core::{DailyRecord, ForecastRecord, PipelineConfig, ReplenishResult};
use replenish_forecasting::{RecommendationEngine, Recommendations, SafetyStockForecaster, enrich};
use replenish_simulation::{DemandSimulator, SkuFailure};

use crate::normalize::normalize;
use crate::summary::RunSummary;

/// Everything one run produces, in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    pub start_date: NaiveDate,
    pub raw: Vec<DailyRecord>,
    pub forecasts: Vec<ForecastRecord>,
    pub recommendations: Recommendations,
    pub failures: Vec<SkuFailure>,
}

/// Sequences simulate → normalize → enrich → forecast → recommend.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Rejects invalid configuration before anything runs.
    pub fn new(config: PipelineConfig) -> ReplenishResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage. `today` anchors the history when the config has no
    /// explicit anchor date.
    pub fn run(&self, today: NaiveDate) -> ReplenishResult<PipelineRun> {
        let cfg = &self.config;
        let start_date = cfg.start_date(today)?;

        let span = info_span!(
            "simulate",
            n_skus = cfg.n_skus,
            n_weeks = cfg.n_weeks,
            seed = cfg.seed
        );
        let report = span.in_scope(|| -> ReplenishResult<_> {
            DemandSimulator::from_config(cfg, start_date)?.simulate(cfg.n_skus)
        })?;
        info!(
            start_date = %start_date,
            records = report.records.len(),
            failed_skus = report.failures.len(),
            "simulated sales history"
        );

        let raw = normalize(report.records)?;

        let enriched = info_span!("enrich", window = cfg.rolling_window)
            .in_scope(|| enrich(&raw, cfg.rolling_window))?;
        info!(records = enriched.len(), "computed rolling demand statistics");

        let forecaster = SafetyStockForecaster::new(cfg.service_level_z)?;
        let forecasts = info_span!("forecast", service_level_z = cfg.service_level_z)
            .in_scope(|| forecaster.forecast_all(&enriched));
        info!(records = forecasts.len(), "computed safety stock and reorder points");

        let recommendations =
            info_span!("recommend").in_scope(|| RecommendationEngine::new().recommend(&forecasts))?;
        info!(
            snapshot_skus = recommendations.snapshot.len(),
            skus_to_order = recommendations.to_order.len(),
            "generated recommendations"
        );

        Ok(PipelineRun {
            start_date,
            raw,
            forecasts,
            recommendations,
            failures: report.failures,
        })
    }

    pub fn summarize(&self, run: &PipelineRun) -> RunSummary {
        RunSummary::new(&self.config, run)
    }
}

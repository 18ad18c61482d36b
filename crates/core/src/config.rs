//! Run configuration.
//!
//! Defaults reproduce the reference catalog: 50 SKUs over 12 weeks, seed 42,
//! a 95% service level and a 14-day rolling window.

use core::ops::Range;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ReplenishError, ReplenishResult};

/// Service-level multiplier for ~95% cycle service under normal demand.
pub const DEFAULT_SERVICE_LEVEL_Z: f64 = 1.65;

/// Trailing window used for demand statistics.
pub const DEFAULT_ROLLING_WINDOW: usize = 14;

/// Weekday demand multipliers, Monday first.
pub const DEFAULT_SEASONALITY: [f64; 7] = [0.8, 0.8, 0.9, 1.0, 1.2, 1.4, 1.3];

/// Parameters of the synthetic demand/supply generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Base daily demand, drawn uniformly (end exclusive).
    pub base_demand: Range<u32>,
    /// Replenishment lead time in days, drawn uniformly (end exclusive).
    pub lead_time_days: Range<u32>,
    /// Daily trend slope is drawn from `[-trend_slope_max, trend_slope_max)`.
    pub trend_slope_max: f64,
    /// Weekday multipliers, Monday first.
    pub seasonality: [f64; 7],
    /// Standard deviation of the multiplicative noise around 1.0.
    pub noise_sd: f64,
    /// Extra days of base demand on top of lead-time demand in the simulator trigger.
    pub safety_buffer_days: u32,
    /// Days of base demand covered by one replenishment order.
    pub order_cover_days: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            base_demand: 10..50,
            lead_time_days: 3..10,
            trend_slope_max: 0.0005,
            seasonality: DEFAULT_SEASONALITY,
            noise_sd: 0.1,
            safety_buffer_days: 3,
            order_cover_days: 14,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> ReplenishResult<()> {
        if self.base_demand.is_empty() || self.base_demand.start == 0 {
            return Err(ReplenishError::invalid_config(format!(
                "base_demand range must be non-empty and positive (got {:?})",
                self.base_demand
            )));
        }
        if self.lead_time_days.is_empty() || self.lead_time_days.start == 0 {
            return Err(ReplenishError::invalid_config(format!(
                "lead_time_days range must be non-empty and positive (got {:?})",
                self.lead_time_days
            )));
        }
        if !(self.trend_slope_max.is_finite() && self.trend_slope_max >= 0.0) {
            return Err(ReplenishError::invalid_config(
                "trend_slope_max must be a finite non-negative number",
            ));
        }
        if !(self.noise_sd.is_finite() && self.noise_sd >= 0.0) {
            return Err(ReplenishError::invalid_config(
                "noise_sd must be a finite non-negative number",
            ));
        }
        if self.seasonality.iter().any(|f| !(f.is_finite() && *f >= 0.0)) {
            return Err(ReplenishError::invalid_config(
                "seasonality factors must be finite and non-negative",
            ));
        }
        if self.order_cover_days == 0 {
            return Err(ReplenishError::invalid_config("order_cover_days must be > 0"));
        }
        // Levels grow with both demand and lead time, so the range maxima bound every draw.
        let base_max = i64::from(self.base_demand.end - 1);
        let lead_max = self.lead_time_days.end - 1;
        if self.replenishment_levels(base_max, lead_max).is_none() {
            return Err(ReplenishError::invalid_config(format!(
                "stock levels overflow for base_demand {base_max} and lead_time_days {lead_max}"
            )));
        }
        Ok(())
    }

    /// Simulator trigger level and order quantity for one SKU:
    /// `(base * lead + base * safety_buffer_days, base * order_cover_days)`.
    ///
    /// `None` when either level, or their sum (the starting stock), does not
    /// fit in an `i64`.
    pub fn replenishment_levels(
        &self,
        base_demand: i64,
        lead_time_days: u32,
    ) -> Option<(i64, i64)> {
        let threshold = base_demand
            .checked_mul(i64::from(lead_time_days))?
            .checked_add(base_demand.checked_mul(i64::from(self.safety_buffer_days))?)?;
        let order_quantity = base_demand.checked_mul(i64::from(self.order_cover_days))?;
        threshold.checked_add(order_quantity)?;
        Some((threshold, order_quantity))
    }
}

/// Number of simulated days in `n_weeks` weeks.
pub fn weeks_to_days(n_weeks: u32) -> ReplenishResult<u32> {
    n_weeks
        .checked_mul(7)
        .ok_or_else(|| ReplenishError::invalid_config(format!("n_weeks {n_weeks} is too large")))
}

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub n_skus: u32,
    pub n_weeks: u32,
    pub seed: u64,
    pub service_level_z: f64,
    pub rolling_window: usize,
    /// Date the simulated history ends before; `None` means "today".
    pub anchor_date: Option<NaiveDate>,
    pub simulation: SimulationParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            n_skus: 50,
            n_weeks: 12,
            seed: 42,
            service_level_z: DEFAULT_SERVICE_LEVEL_Z,
            rolling_window: DEFAULT_ROLLING_WINDOW,
            anchor_date: None,
            simulation: SimulationParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Fail fast on any setting that would make the run meaningless.
    pub fn validate(&self) -> ReplenishResult<()> {
        if self.n_skus == 0 {
            return Err(ReplenishError::invalid_config("n_skus must be > 0"));
        }
        if self.n_weeks == 0 {
            return Err(ReplenishError::invalid_config("n_weeks must be > 0"));
        }
        if !(self.service_level_z.is_finite() && self.service_level_z > 0.0) {
            return Err(ReplenishError::invalid_config(
                "service_level_z must be a finite positive number",
            ));
        }
        if self.rolling_window == 0 {
            return Err(ReplenishError::invalid_config("rolling_window must be > 0"));
        }
        self.total_days()?;
        self.simulation.validate()
    }

    pub fn total_days(&self) -> ReplenishResult<u32> {
        weeks_to_days(self.n_weeks)
    }

    /// First simulated date: `n_weeks` weeks before the anchor.
    ///
    /// `today` is used when no explicit anchor is configured.
    pub fn start_date(&self, today: NaiveDate) -> ReplenishResult<NaiveDate> {
        let anchor = self.anchor_date.unwrap_or(today);
        let total_days = self.total_days()?;
        anchor
            .checked_sub_days(Days::new(u64::from(total_days)))
            .ok_or_else(|| {
                ReplenishError::invalid_config(format!(
                    "{} weeks before {anchor} is out of the supported date range",
                    self.n_weeks
                ))
            })
    }
}

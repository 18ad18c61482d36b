use replenish_core::config::DEFAULT_SERVICE_LEVEL_Z;
use replenish_core::{EnrichedRecord, ForecastRecord, ReplenishError, ReplenishResult};

/// `z * demand_std * sqrt(lead_time_days)`.
pub fn safety_stock(service_level_z: f64, demand_std: f64, lead_time_days: u32) -> f64 {
    service_level_z * demand_std * f64::from(lead_time_days).sqrt()
}

/// `avg_daily_demand * lead_time_days + safety_stock`.
pub fn reorder_point(avg_daily_demand: f64, lead_time_days: u32, safety_stock: f64) -> f64 {
    avg_daily_demand * f64::from(lead_time_days) + safety_stock
}

/// Stateless per-record safety stock / reorder point calculator.
///
/// Assumes normally distributed daily demand; `service_level_z` is the
/// standard-normal quantile of the target cycle service level.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SafetyStockForecaster {
    service_level_z: f64,
}

impl Default for SafetyStockForecaster {
    fn default() -> Self {
        Self {
            service_level_z: DEFAULT_SERVICE_LEVEL_Z,
        }
    }
}

impl SafetyStockForecaster {
    pub fn new(service_level_z: f64) -> ReplenishResult<Self> {
        if !(service_level_z.is_finite() && service_level_z > 0.0) {
            return Err(ReplenishError::invalid_config(
                "service_level_z must be a finite positive number",
            ));
        }
        Ok(Self { service_level_z })
    }

    pub fn service_level_z(&self) -> f64 {
        self.service_level_z
    }

    pub fn forecast(&self, record: &EnrichedRecord) -> ForecastRecord {
        let ss = safety_stock(
            self.service_level_z,
            record.demand_std,
            record.lead_time_days,
        );
        let rop = reorder_point(record.avg_daily_demand, record.lead_time_days, ss);
        ForecastRecord::new(record, ss, rop)
    }

    pub fn forecast_all(&self, records: &[EnrichedRecord]) -> Vec<ForecastRecord> {
        records.iter().map(|r| self.forecast(r)).collect()
    }
}

use rand::Rng;
use serde::{Deserialize, Serialize};

use replenish_core::{ReplenishError, ReplenishResult, SimulationParams, SkuId};

/// Per-SKU generator parameters, drawn once at simulation start.
///
/// `reorder_point_threshold` is the simulator's own trigger
/// (`base * lead_time + base * buffer_days`). It is unrelated to the
/// statistical reorder point computed by the forecaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuParameters {
    pub sku_id: SkuId,
    pub base_demand: i64,
    /// Fractional daily drift of expected demand.
    pub trend_slope: f64,
    pub lead_time_days: u32,
    pub reorder_point_threshold: i64,
    pub order_quantity: i64,
}

impl SkuParameters {
    /// Derive the replenishment settings from demand and lead time.
    ///
    /// Fails when the derived stock levels do not fit in an `i64`.
    pub fn new(
        sku_id: SkuId,
        base_demand: i64,
        trend_slope: f64,
        lead_time_days: u32,
        sim: &SimulationParams,
    ) -> ReplenishResult<Self> {
        let (reorder_point_threshold, order_quantity) = sim
            .replenishment_levels(base_demand, lead_time_days)
            .ok_or_else(|| {
                ReplenishError::invalid_config(format!(
                    "{sku_id}: stock levels overflow for base_demand {base_demand} \
                     and lead_time_days {lead_time_days}"
                ))
            })?;
        Ok(Self {
            sku_id,
            base_demand,
            trend_slope,
            lead_time_days,
            reorder_point_threshold,
            order_quantity,
        })
    }

    /// Draw base demand, trend slope and lead time (in that order) from `rng`.
    pub fn draw<R: Rng + ?Sized>(
        sku_id: SkuId,
        sim: &SimulationParams,
        rng: &mut R,
    ) -> ReplenishResult<Self> {
        let base_demand = i64::from(rng.gen_range(sim.base_demand.clone()));
        let trend_slope = if sim.trend_slope_max > 0.0 {
            rng.gen_range(-sim.trend_slope_max..sim.trend_slope_max)
        } else {
            0.0
        };
        let lead_time_days = rng.gen_range(sim.lead_time_days.clone());
        Self::new(sku_id, base_demand, trend_slope, lead_time_days, sim)
    }

    pub fn validate(&self) -> ReplenishResult<()> {
        if self.base_demand <= 0 {
            return Err(ReplenishError::invalid_config(format!(
                "{}: base_demand must be > 0 (got {})",
                self.sku_id, self.base_demand
            )));
        }
        if self.lead_time_days == 0 {
            return Err(ReplenishError::invalid_config(format!(
                "{}: lead_time_days must be > 0",
                self.sku_id
            )));
        }
        if self.order_quantity <= 0 {
            return Err(ReplenishError::invalid_config(format!(
                "{}: order_quantity must be > 0 (got {})",
                self.sku_id, self.order_quantity
            )));
        }
        if !self.trend_slope.is_finite() {
            return Err(ReplenishError::invalid_config(format!(
                "{}: trend_slope must be finite",
                self.sku_id
            )));
        }
        if self.reorder_point_threshold < 0
            || self
                .reorder_point_threshold
                .checked_add(self.order_quantity)
                .is_none()
        {
            return Err(ReplenishError::invalid_config(format!(
                "{}: reorder_point_threshold must be >= 0 and leave room for one order",
                self.sku_id
            )));
        }
        Ok(())
    }

    /// Stock held before day one: trigger level plus one full order.
    pub fn initial_on_hand(&self) -> i64 {
        self.reorder_point_threshold
            .saturating_add(self.order_quantity)
    }
}

//! Record tables passed between pipeline stages.
//!
//! Every table is keyed by `(sku_id, date)`. Records are plain values: each
//! stage consumes one table and produces the next without mutating its input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ReplenishError, ReplenishResult};
use crate::id::SkuId;

/// One simulated day for one SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub sku_id: SkuId,
    /// Units actually sold (capped by stock on hand).
    pub sales: u32,
    /// Stock left at the end of the day.
    pub on_hand: i64,
    pub lead_time_days: u32,
}

impl DailyRecord {
    pub fn key(&self) -> (SkuId, NaiveDate) {
        (self.sku_id, self.date)
    }

    /// Check the table invariants for a single row.
    pub fn validate(&self) -> ReplenishResult<()> {
        if self.lead_time_days == 0 {
            return Err(ReplenishError::invalid_record(format!(
                "{} on {}: lead_time_days must be > 0",
                self.sku_id, self.date
            )));
        }
        if self.on_hand < 0 {
            return Err(ReplenishError::invalid_record(format!(
                "{} on {}: on_hand cannot be negative (found {})",
                self.sku_id, self.date, self.on_hand
            )));
        }
        Ok(())
    }
}

/// Daily record plus trailing demand statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub date: NaiveDate,
    pub sku_id: SkuId,
    pub sales: u32,
    pub on_hand: i64,
    pub lead_time_days: u32,
    pub avg_daily_demand: f64,
    pub demand_std: f64,
}

impl EnrichedRecord {
    pub fn new(record: &DailyRecord, avg_daily_demand: f64, demand_std: f64) -> Self {
        Self {
            date: record.date,
            sku_id: record.sku_id,
            sales: record.sales,
            on_hand: record.on_hand,
            lead_time_days: record.lead_time_days,
            avg_daily_demand,
            demand_std,
        }
    }
}

/// Enriched record plus safety stock and reorder point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    pub sku_id: SkuId,
    pub sales: u32,
    pub on_hand: i64,
    pub lead_time_days: u32,
    pub avg_daily_demand: f64,
    pub demand_std: f64,
    pub safety_stock: f64,
    /// Raw value; not clamped at zero.
    pub reorder_point: f64,
}

impl ForecastRecord {
    pub fn new(record: &EnrichedRecord, safety_stock: f64, reorder_point: f64) -> Self {
        Self {
            date: record.date,
            sku_id: record.sku_id,
            sales: record.sales,
            on_hand: record.on_hand,
            lead_time_days: record.lead_time_days,
            avg_daily_demand: record.avg_daily_demand,
            demand_std: record.demand_std,
            safety_stock,
            reorder_point,
        }
    }
}

/// Purchase recommendation for one SKU at the latest date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub date: NaiveDate,
    pub sku_id: SkuId,
    pub on_hand: i64,
    pub lead_time_days: u32,
    pub avg_daily_demand: f64,
    pub safety_stock: f64,
    pub reorder_point: f64,
    /// `max(0, reorder_point - on_hand)`.
    pub suggested_order_qty: f64,
    /// `reorder_point - on_hand`; negative means surplus.
    pub stockout_risk: f64,
}

impl RecommendationRecord {
    pub fn from_forecast(record: &ForecastRecord) -> Self {
        let stockout_risk = record.reorder_point - record.on_hand as f64;
        Self {
            date: record.date,
            sku_id: record.sku_id,
            on_hand: record.on_hand,
            lead_time_days: record.lead_time_days,
            avg_daily_demand: record.avg_daily_demand,
            safety_stock: record.safety_stock,
            reorder_point: record.reorder_point,
            suggested_order_qty: stockout_risk.max(0.0),
            stockout_risk,
        }
    }

    pub fn needs_order(&self) -> bool {
        self.suggested_order_qty > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily(on_hand: i64, lead_time_days: u32) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            sku_id: SkuId::from_index(1),
            sales: 4,
            on_hand,
            lead_time_days,
        }
    }

    #[test]
    fn validate_rejects_negative_stock() {
        let err = daily(-1, 5).validate().unwrap_err();
        match err {
            ReplenishError::InvalidRecord(msg) if msg.contains("on_hand") => {}
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_zero_lead_time() {
        assert!(daily(10, 0).validate().is_err());
        assert!(daily(10, 1).validate().is_ok());
    }

    #[test]
    fn recommendation_clamps_order_but_not_risk() {
        let enriched = EnrichedRecord::new(&daily(130, 5), 20.0, 0.0);
        let forecast = ForecastRecord::new(&enriched, 0.0, 100.0);
        let rec = RecommendationRecord::from_forecast(&forecast);
        assert_eq!(rec.suggested_order_qty, 0.0);
        assert_eq!(rec.stockout_risk, -30.0);
        assert!(!rec.needs_order());
    }

    #[test]
    fn recommendation_at_exact_reorder_point_orders_nothing() {
        let enriched = EnrichedRecord::new(&daily(100, 5), 20.0, 0.0);
        let forecast = ForecastRecord::new(&enriched, 0.0, 100.0);
        let rec = RecommendationRecord::from_forecast(&forecast);
        assert_eq!(rec.suggested_order_qty, 0.0);
        assert_eq!(rec.stockout_risk, 0.0);
    }
}

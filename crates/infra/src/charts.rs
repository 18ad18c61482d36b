//! Data views behind the two report charts.
//!
//! Rendering lives outside this crate; these functions only shape the rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use replenish_core::{ForecastRecord, SkuId};
use replenish_forecasting::Recommendations;

/// Bar of the "top SKUs by stockout risk" chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBar {
    pub sku_id: SkuId,
    pub stockout_risk: f64,
}

/// The `n` highest-risk rows, in the to-order ranking.
pub fn top_stockout_risk(recommendations: &Recommendations, n: usize) -> Vec<RiskBar> {
    recommendations
        .top_risk(n)
        .iter()
        .map(|r| RiskBar {
            sku_id: r.sku_id,
            stockout_risk: r.stockout_risk,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub sales: u32,
    pub avg_daily_demand: f64,
    pub on_hand: i64,
}

/// Sales, rolling demand and stock for one SKU, plus the latest reorder
/// point as a reference line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandTrend {
    pub sku_id: SkuId,
    pub points: Vec<TrendPoint>,
    pub reorder_point: f64,
}

/// SKU shown in the demand trend chart: the lowest identifier present.
pub fn representative_sku(forecasts: &[ForecastRecord]) -> Option<SkuId> {
    forecasts.iter().map(|r| r.sku_id).min()
}

pub fn demand_trend(forecasts: &[ForecastRecord], sku_id: SkuId) -> Option<DemandTrend> {
    let mut rows: Vec<&ForecastRecord> = forecasts.iter().filter(|r| r.sku_id == sku_id).collect();
    rows.sort_by_key(|r| r.date);
    let last = rows.last()?;
    Some(DemandTrend {
        sku_id,
        reorder_point: last.reorder_point,
        points: rows
            .iter()
            .map(|r| TrendPoint {
                date: r.date,
                sales: r.sales,
                avg_daily_demand: r.avg_daily_demand,
                on_hand: r.on_hand,
            })
            .collect(),
    })
}

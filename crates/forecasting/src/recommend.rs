use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use replenish_core::{ForecastRecord, RecommendationRecord, ReplenishError, ReplenishResult};

/// Output of one recommendation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    /// Latest date in the input; `None` when the input was empty.
    pub as_of: Option<NaiveDate>,
    /// One row per SKU at `as_of`, ordered by `sku_id`.
    pub snapshot: Vec<RecommendationRecord>,
    /// Rows with a positive suggested quantity, highest risk first.
    pub to_order: Vec<RecommendationRecord>,
}

impl Recommendations {
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// The `n` most urgent rows of the to-order list.
    pub fn top_risk(&self, n: usize) -> &[RecommendationRecord] {
        &self.to_order[..n.min(self.to_order.len())]
    }
}

/// Builds purchase recommendations from the most recent forecast snapshot.
#[derive(Debug, Default, Copy, Clone)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Select the rows at the latest date, derive order quantity and risk,
    /// and rank the SKUs that need ordering.
    ///
    /// Empty input yields empty output. Two rows for the same SKU on the
    /// latest date are a [`ReplenishError::StateInconsistency`].
    pub fn recommend(&self, records: &[ForecastRecord]) -> ReplenishResult<Recommendations> {
        let Some(as_of) = records.iter().map(|r| r.date).max() else {
            return Ok(Recommendations::default());
        };

        let mut seen = BTreeSet::new();
        let mut snapshot = Vec::new();
        for record in records.iter().filter(|r| r.date == as_of) {
            if !seen.insert(record.sku_id) {
                return Err(ReplenishError::duplicate(record.sku_id, as_of));
            }
            snapshot.push(RecommendationRecord::from_forecast(record));
        }
        snapshot.sort_by_key(|r| r.sku_id);

        let mut to_order: Vec<RecommendationRecord> =
            snapshot.iter().filter(|r| r.needs_order()).cloned().collect();
        to_order.sort_by(by_risk_desc);

        tracing::debug!(
            as_of = %as_of,
            skus = snapshot.len(),
            to_order = to_order.len(),
            "built recommendations"
        );

        Ok(Recommendations {
            as_of: Some(as_of),
            snapshot,
            to_order,
        })
    }
}

fn by_risk_desc(a: &RecommendationRecord, b: &RecommendationRecord) -> Ordering {
    b.stockout_risk
        .total_cmp(&a.stockout_risk)
        .then_with(|| a.sku_id.cmp(&b.sku_id))
}

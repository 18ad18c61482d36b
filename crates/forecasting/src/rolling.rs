use std::collections::{BTreeMap, VecDeque};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use replenish_core::{DailyRecord, EnrichedRecord, ReplenishError, ReplenishResult, SkuId};

/// Mean and sample standard deviation of a demand window.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandStats {
    pub mean: f64,
    pub std: f64,
}

/// Trailing window over integer daily sales.
///
/// Keeps exact integer running sums, so adding and evicting values never
/// accumulates floating-point drift. The window grows until it holds
/// `capacity` values and then slides.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<u32>,
    sum: u128,
    sum_sq: u128,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            values: VecDeque::with_capacity(capacity.max(1)),
            sum: 0,
            sum_sq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Add the next value, evicting the oldest once full, and return the
    /// statistics of the updated window.
    pub fn push(&mut self, value: u32) -> DemandStats {
        if self.is_full() {
            if let Some(old) = self.values.pop_front() {
                let old = u128::from(old);
                self.sum -= old;
                self.sum_sq -= old * old;
            }
        }
        let v = u128::from(value);
        self.values.push_back(value);
        self.sum += v;
        self.sum_sq += v * v;
        self.stats()
    }

    /// Empty windows report zeros; single-value windows report `std = 0`.
    pub fn stats(&self) -> DemandStats {
        let n = self.values.len() as u128;
        if n == 0 {
            return DemandStats::default();
        }
        let mean = self.sum as f64 / n as f64;
        if n < 2 {
            return DemandStats { mean, std: 0.0 };
        }
        // n * Σx² - (Σx)² is exact and non-negative for integers.
        let numerator = n * self.sum_sq - self.sum * self.sum;
        let variance = numerator as f64 / (n * (n - 1)) as f64;
        DemandStats {
            mean,
            std: variance.sqrt(),
        }
    }
}

/// Trailing statistics for every position of a chronologically ordered series.
pub fn rolling_stats(series: &[u32], window: usize) -> Vec<DemandStats> {
    let mut rolling = RollingWindow::new(window);
    series.iter().map(|v| rolling.push(*v)).collect()
}

/// Attach trailing demand statistics to every record, per SKU.
///
/// Input may be in any order. Output is ordered by `(sku_id, date)`; windows
/// never span two SKUs. Invalid rows and duplicate `(sku_id, date)` keys are
/// rejected.
pub fn enrich(records: &[DailyRecord], window: usize) -> ReplenishResult<Vec<EnrichedRecord>> {
    if window == 0 {
        return Err(ReplenishError::invalid_config("rolling window must be > 0"));
    }

    let mut by_sku: BTreeMap<SkuId, Vec<&DailyRecord>> = BTreeMap::new();
    for record in records {
        record.validate()?;
        by_sku.entry(record.sku_id).or_default().push(record);
    }

    let per_sku: Vec<ReplenishResult<Vec<EnrichedRecord>>> = by_sku
        .into_par_iter()
        .map(|(_, mut history)| {
            history.sort_by_key(|r| r.date);
            if let Some(dup) = history.windows(2).find(|w| w[0].date == w[1].date) {
                return Err(ReplenishError::duplicate(dup[1].sku_id, dup[1].date));
            }
            let mut rolling = RollingWindow::new(window);
            Ok(history
                .into_iter()
                .map(|r| {
                    let stats = rolling.push(r.sales);
                    EnrichedRecord::new(r, stats.mean, stats.std)
                })
                .collect())
        })
        .collect();

    let mut enriched = Vec::with_capacity(records.len());
    for sku in per_sku {
        enriched.extend(sku?);
    }
    Ok(enriched)
}

/// Recompute a window from scratch (reference for tests and benchmarks).
pub fn naive_stats(window: &[u32]) -> DemandStats {
    let xs: Vec<f64> = window.iter().map(|v| f64::from(*v)).collect();
    let mean = mean(&xs);
    DemandStats {
        mean,
        std: stddev_sample(&xs, mean),
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / (xs.len() as f64)
}

/// Sample standard deviation (n-1).
fn stddev_sample(xs: &[f64], mean: f64) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let var = xs
        .iter()
        .map(|x| {
            let d = x - mean;
            d * d
        })
        .sum::<f64>()
        / ((xs.len() - 1) as f64);
    var.sqrt()
}

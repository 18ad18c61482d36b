use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};

use replenish_core::{ReplenishError, ReplenishResult, SimulationParams};

use crate::params::SkuParameters;

/// Expected-demand model for one SKU.
///
/// `rate = base * trend[day] * seasonality[weekday] * noise`, with
/// `noise ~ N(1, sd)` floored at zero. Daily sales are Poisson around `rate`.
#[derive(Debug, Clone)]
pub struct DemandModel {
    base_demand: f64,
    trend: Vec<f64>,
    seasonality: [f64; 7],
    noise: Normal<f64>,
}

impl DemandModel {
    pub fn new(
        params: &SkuParameters,
        sim: &SimulationParams,
        total_days: u32,
    ) -> ReplenishResult<Self> {
        let noise = Normal::new(1.0, sim.noise_sd)
            .map_err(|e| ReplenishError::invalid_config(format!("noise_sd: {e}")))?;
        Ok(Self {
            base_demand: params.base_demand as f64,
            trend: trend_multipliers(params.trend_slope, total_days),
            seasonality: sim.seasonality,
            noise,
        })
    }

    /// Expected demand for `day` given an already drawn noise factor.
    pub fn expected_rate(&self, day: usize, date: NaiveDate, noise: f64) -> f64 {
        let weekday = date.weekday().num_days_from_monday() as usize;
        let trend = self.trend.get(day).copied().unwrap_or(1.0);
        (self.base_demand * trend * self.seasonality[weekday] * noise.max(0.0)).max(0.0)
    }

    /// Draw the day's demand: one normal noise sample, then one Poisson sample.
    pub fn draw<R: Rng + ?Sized>(&self, day: usize, date: NaiveDate, rng: &mut R) -> u32 {
        let noise = self.noise.sample(rng);
        let lambda = self.expected_rate(day, date, noise);
        // Poisson is undefined at zero; a zero rate sells nothing.
        match Poisson::new(lambda) {
            Ok(poisson) => poisson.sample(rng) as u32,
            Err(_) => 0,
        }
    }
}

/// `1 + linspace(0, slope * total_days, total_days)`: a straight-line ramp.
pub fn trend_multipliers(slope: f64, total_days: u32) -> Vec<f64> {
    let n = total_days as usize;
    let end = slope * f64::from(total_days);
    match n {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let step = end / (n - 1) as f64;
            (0..n).map(|i| 1.0 + step * i as f64).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use replenish_core::SkuId;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn trend_is_linear_from_one() {
        let t = trend_multipliers(0.001, 11);
        assert_eq!(t.len(), 11);
        assert_eq!(t[0], 1.0);
        assert!((t[10] - 1.011).abs() < 1e-12);
        assert!((t[5] - 1.0055).abs() < 1e-12);
    }

    #[test]
    fn trend_handles_degenerate_horizons() {
        assert!(trend_multipliers(0.001, 0).is_empty());
        assert_eq!(trend_multipliers(0.001, 1), vec![1.0]);
    }

    #[test]
    fn expected_rate_applies_weekday_profile() {
        let sim = SimulationParams::default();
        let params = SkuParameters::new(SkuId::from_index(1), 20, 0.0, 5, &sim).unwrap();
        let model = DemandModel::new(&params, &sim, 14).unwrap();
        let saturday = monday() + chrono::Days::new(5);
        assert!((model.expected_rate(0, monday(), 1.0) - 16.0).abs() < 1e-12);
        assert!((model.expected_rate(5, saturday, 1.0) - 28.0).abs() < 1e-12);
    }

    #[test]
    fn negative_noise_floors_rate_at_zero() {
        let sim = SimulationParams::default();
        let params = SkuParameters::new(SkuId::from_index(1), 20, 0.0, 5, &sim).unwrap();
        let model = DemandModel::new(&params, &sim, 7).unwrap();
        assert_eq!(model.expected_rate(0, monday(), -0.5), 0.0);
    }

    #[test]
    fn zero_rate_draws_no_sales() {
        let sim = SimulationParams {
            seasonality: [0.0; 7],
            ..SimulationParams::default()
        };
        let params = SkuParameters::new(SkuId::from_index(1), 20, 0.0, 5, &sim).unwrap();
        let model = DemandModel::new(&params, &sim, 7).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        for day in 0..7 {
            assert_eq!(model.draw(day, monday() + chrono::Days::new(day as u64), &mut rng), 0);
        }
    }
}

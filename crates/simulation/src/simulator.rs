use chrono::{Days, NaiveDate};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use replenish_core::config::weeks_to_days;
use replenish_core::{
    DailyRecord, PipelineConfig, ReplenishError, ReplenishResult, SimulationParams, SkuId,
};

use crate::demand::DemandModel;
use crate::params::SkuParameters;
use crate::state::SkuSimState;

/// A SKU whose simulation could not run; the rest of the catalog is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuFailure {
    pub sku_id: SkuId,
    pub reason: String,
}

/// Simulation output: records ordered by `(sku_id, date)` plus isolated failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationReport {
    pub records: Vec<DailyRecord>,
    pub failures: Vec<SkuFailure>,
}

impl SimulationReport {
    fn merge(mut outcomes: Vec<(SkuId, ReplenishResult<Vec<DailyRecord>>)>) -> Self {
        outcomes.sort_by_key(|(sku_id, _)| *sku_id);
        let mut report = Self::default();
        for (sku_id, outcome) in outcomes {
            match outcome {
                Ok(records) => report.records.extend(records),
                Err(e) => {
                    tracing::warn!(sku_id = %sku_id, error = %e, "sku simulation failed");
                    report.failures.push(SkuFailure {
                        sku_id,
                        reason: e.to_string(),
                    });
                }
            }
        }
        report
    }
}

/// Independent random stream for one SKU.
///
/// Every SKU shares the run seed but reads its own ChaCha stream, so results
/// do not depend on scheduling or on how many other SKUs are simulated.
pub fn sku_rng(seed: u64, sku_id: SkuId) -> ChaCha20Rng {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    rng.set_stream(u64::from(sku_id.index()));
    rng
}

/// Run one SKU's daily loop for `total_days` days starting at `start_date`.
pub fn simulate_sku<R: Rng + ?Sized>(
    params: &SkuParameters,
    sim: &SimulationParams,
    start_date: NaiveDate,
    total_days: u32,
    rng: &mut R,
) -> ReplenishResult<Vec<DailyRecord>> {
    params.validate()?;
    let model = DemandModel::new(params, sim, total_days)?;
    let mut state = SkuSimState::new(params.clone());
    let mut records = Vec::with_capacity(total_days as usize);

    for day in 0..total_days {
        let date = start_date
            .checked_add_days(Days::new(u64::from(day)))
            .ok_or_else(|| {
                ReplenishError::invalid_config(format!(
                    "day {day} after {start_date} is out of range"
                ))
            })?;
        let demand = model.draw(day as usize, date, rng);
        let step = state.step(date, demand)?;
        records.push(DailyRecord {
            date,
            sku_id: params.sku_id,
            sales: step.sold,
            on_hand: step.on_hand,
            lead_time_days: params.lead_time_days,
        });
    }

    Ok(records)
}

/// Catalog-level simulator.
#[derive(Debug, Clone)]
pub struct DemandSimulator {
    sim: SimulationParams,
    seed: u64,
    start_date: NaiveDate,
    total_days: u32,
}

impl DemandSimulator {
    pub fn new(
        sim: SimulationParams,
        seed: u64,
        start_date: NaiveDate,
        n_weeks: u32,
    ) -> ReplenishResult<Self> {
        if n_weeks == 0 {
            return Err(ReplenishError::invalid_config("n_weeks must be > 0"));
        }
        let total_days = weeks_to_days(n_weeks)?;
        sim.validate()?;
        Ok(Self {
            sim,
            seed,
            start_date,
            total_days,
        })
    }

    pub fn from_config(config: &PipelineConfig, start_date: NaiveDate) -> ReplenishResult<Self> {
        config.validate()?;
        Self::new(
            config.simulation.clone(),
            config.seed,
            start_date,
            config.n_weeks,
        )
    }

    /// Simulate `SKU_001..=SKU_n` with randomly drawn parameters.
    ///
    /// Each SKU draws its parameters and then its daily demand from its own
    /// stream (see [`sku_rng`]).
    pub fn simulate(&self, n_skus: u32) -> ReplenishResult<SimulationReport> {
        if n_skus == 0 {
            return Err(ReplenishError::invalid_config("n_skus must be > 0"));
        }

        let outcomes = (0..n_skus)
            .into_par_iter()
            .map(|i| {
                let sku_id = SkuId::from_index(i + 1);
                let mut rng = sku_rng(self.seed, sku_id);
                let params = match SkuParameters::draw(sku_id, &self.sim, &mut rng) {
                    Ok(params) => params,
                    Err(err) => return (sku_id, Err(err)),
                };
                tracing::debug!(
                    sku_id = %sku_id,
                    base_demand = params.base_demand,
                    trend_slope = params.trend_slope,
                    lead_time_days = params.lead_time_days,
                    reorder_point_threshold = params.reorder_point_threshold,
                    order_quantity = params.order_quantity,
                    "drew sku parameters"
                );
                (sku_id, self.run(&params, &mut rng))
            })
            .collect();

        Ok(SimulationReport::merge(outcomes))
    }

    /// Simulate explicitly supplied parameter sets.
    ///
    /// Invalid sets are reported as failures without affecting the others.
    /// Daily draws come from a fresh [`sku_rng`] stream per SKU.
    pub fn simulate_skus(&self, skus: Vec<SkuParameters>) -> SimulationReport {
        let outcomes = skus
            .into_par_iter()
            .map(|params| {
                let mut rng = sku_rng(self.seed, params.sku_id);
                (params.sku_id, self.run(&params, &mut rng))
            })
            .collect();
        SimulationReport::merge(outcomes)
    }

    fn run(
        &self,
        params: &SkuParameters,
        rng: &mut ChaCha20Rng,
    ) -> ReplenishResult<Vec<DailyRecord>> {
        simulate_sku(params, &self.sim, self.start_date, self.total_days, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn simulator(seed: u64, n_weeks: u32) -> DemandSimulator {
        DemandSimulator::new(SimulationParams::default(), seed, start(), n_weeks).unwrap()
    }

    #[test]
    fn emits_one_record_per_sku_per_day_in_key_order() {
        let report = simulator(42, 2).simulate(3).unwrap();
        assert!(report.failures.is_empty());
        assert_eq!(report.records.len(), 3 * 14);

        let keys: Vec<_> = report.records.iter().map(DailyRecord::key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(report.records[0].date, start());
        assert_eq!(report.records[13].date, start() + Days::new(13));
    }

    #[test]
    fn same_seed_reproduces_identical_records() {
        let a = simulator(42, 12).simulate(10).unwrap();
        let b = simulator(42, 12).simulate(10).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = simulator(1, 4).simulate(5).unwrap();
        let b = simulator(2, 4).simulate(5).unwrap();
        assert_ne!(a.records, b.records);
    }

    #[test]
    fn sku_streams_do_not_depend_on_catalog_size() {
        let small = simulator(9, 3).simulate(2).unwrap();
        let large = simulator(9, 3).simulate(8).unwrap();
        let pick = |r: &SimulationReport| -> Vec<DailyRecord> {
            r.records
                .iter()
                .filter(|rec| rec.sku_id == SkuId::from_index(2))
                .cloned()
                .collect()
        };
        assert_eq!(pick(&small), pick(&large));
    }

    #[test]
    fn lead_time_is_constant_per_sku() {
        let report = simulator(3, 4).simulate(4).unwrap();
        for sku in 1..=4 {
            let leads: Vec<u32> = report
                .records
                .iter()
                .filter(|r| r.sku_id == SkuId::from_index(sku))
                .map(|r| r.lead_time_days)
                .collect();
            assert!(leads.windows(2).all(|w| w[0] == w[1]));
            assert!((3..10).contains(&leads[0]));
        }
    }

    #[test]
    fn invalid_sku_is_isolated() {
        let sim = SimulationParams::default();
        let good = SkuParameters::new(SkuId::from_index(1), 20, 0.0, 5, &sim).unwrap();
        let bad = SkuParameters::new(SkuId::from_index(2), 20, 0.0, 0, &sim).unwrap();
        let also_good = SkuParameters::new(SkuId::from_index(3), 15, 0.0001, 4, &sim).unwrap();

        let report = simulator(42, 2).simulate_skus(vec![bad, good, also_good]);
        assert_eq!(report.records.len(), 2 * 14);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].sku_id, SkuId::from_index(2));
        assert!(report.failures[0].reason.contains("lead_time_days"));
    }

    #[test]
    fn rejects_empty_catalog_and_horizon() {
        assert!(simulator(1, 1).simulate(0).is_err());
        assert!(DemandSimulator::new(SimulationParams::default(), 1, start(), 0).is_err());
    }

    #[test]
    fn rejects_horizon_that_overflows_day_count() {
        let err = DemandSimulator::new(SimulationParams::default(), 1, start(), 700_000_000)
            .unwrap_err();
        assert!(matches!(err, ReplenishError::InvalidConfiguration(_)));
    }

    #[test]
    fn overflowing_stock_levels_are_isolated() {
        let sim = SimulationParams::default();
        let mut huge = SkuParameters::new(SkuId::from_index(1), 20, 0.0, 5, &sim).unwrap();
        huge.order_quantity = i64::MAX;
        let fine = SkuParameters::new(SkuId::from_index(2), 20, 0.0, 5, &sim).unwrap();

        let report = simulator(42, 1).simulate_skus(vec![huge, fine]);
        assert_eq!(report.records.len(), 7);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].sku_id, SkuId::from_index(1));
    }

    #[test]
    fn first_day_draws_down_from_full_stock() {
        let sim = SimulationParams::default();
        let params = SkuParameters::new(SkuId::from_index(1), 20, 0.0, 5, &sim).unwrap();
        let mut rng = sku_rng(42, params.sku_id);
        let records = simulate_sku(&params, &sim, start(), 7, &mut rng).unwrap();
        assert_eq!(records[0].on_hand, params.initial_on_hand() - i64::from(records[0].sales));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 32,
            ..ProptestConfig::default()
        })]

        /// Property: stock never goes negative and every day's sales fit in
        /// the stock available that day.
        #[test]
        fn on_hand_never_negative(seed in any::<u64>(), n_skus in 1u32..6, n_weeks in 1u32..10) {
            let report = simulator(seed, n_weeks).simulate(n_skus).unwrap();
            prop_assert!(report.failures.is_empty());
            prop_assert_eq!(report.records.len(), (n_skus * n_weeks * 7) as usize);
            for r in &report.records {
                prop_assert!(r.on_hand >= 0);
                prop_assert!(r.validate().is_ok());
            }
        }

        /// Property: sold units never exceed drawn demand or available stock.
        #[test]
        fn sales_bounded_by_demand_and_stock(
            seed in any::<u64>(),
            base in 10i64..50,
            lead in 3u32..10,
        ) {
            let sim = SimulationParams::default();
            let params =
                SkuParameters::new(SkuId::from_index(1), base, 0.0003, lead, &sim).unwrap();
            let model = DemandModel::new(&params, &sim, 56).unwrap();
            let mut state = SkuSimState::new(params);
            let mut rng = sku_rng(seed, SkuId::from_index(1));
            for day in 0..56u64 {
                let date = start() + Days::new(day);
                let demand = model.draw(day as usize, date, &mut rng);
                let before = state.on_hand();
                let step = state.step(date, demand).unwrap();
                prop_assert!(step.sold <= step.demand);
                prop_assert!(i64::from(step.sold) <= before + step.received);
                prop_assert!(step.on_hand >= 0);
            }
        }
    }
}

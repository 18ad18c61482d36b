//! Synthetic daily sales/inventory generator.
//!
//! Each SKU is simulated independently with its own random stream: demand
//! follows a linear trend, a weekday profile and multiplicative noise, and
//! stock is replenished by a continuous-review reorder rule with orders in
//! transit for the SKU's lead time.
//!
//! No IO happens here; callers receive the record table in memory.

pub mod demand;
pub mod params;
pub mod simulator;
pub mod state;

pub use demand::DemandModel;
pub use params::SkuParameters;
pub use simulator::{DemandSimulator, SimulationReport, SkuFailure, simulate_sku, sku_rng};
pub use state::{DayStep, PipelineOrder, SkuSimState};

//! `replenish-forecasting`
//!
//! Turns a daily sales history into replenishment decisions:
//! - [`rolling`]: trailing-window demand mean/std per SKU.
//! - [`safety_stock`]: safety stock and reorder point per record.
//! - [`recommend`]: latest-date snapshot and ranked purchase list.
//!
//! Everything here is deterministic and free of IO.

pub mod recommend;
pub mod rolling;
pub mod safety_stock;

pub use recommend::{RecommendationEngine, Recommendations};
pub use rolling::{DemandStats, RollingWindow, enrich, rolling_stats};
pub use safety_stock::SafetyStockForecaster;

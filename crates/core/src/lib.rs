//! `replenish-core` — shared building blocks for the replenishment pipeline.
//!
//! This crate contains **pure** data types (no IO): SKU identifiers, the
//! record tables passed between stages, configuration and the error model.

pub mod config;
pub mod error;
pub mod id;
pub mod record;

pub use config::{PipelineConfig, SimulationParams};
pub use error::{ReplenishError, ReplenishResult};
pub use id::SkuId;
pub use record::{DailyRecord, EnrichedRecord, ForecastRecord, RecommendationRecord};

//! Error model shared by the pipeline stages.

use chrono::NaiveDate;
use thiserror::Error;

use crate::id::SkuId;

/// Result type used across the core stages.
pub type ReplenishResult<T> = Result<T, ReplenishError>;

/// Pipeline-level error.
///
/// All variants are deterministic: rerunning with the same input yields the
/// same error, so none of them are retryable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplenishError {
    /// Configuration rejected before any simulation runs.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// More than one record exists for the same SKU and date.
    #[error("state inconsistency: duplicate record for {sku_id} on {date}")]
    StateInconsistency { sku_id: SkuId, date: NaiveDate },

    /// A record violates a table invariant (e.g. negative stock).
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl ReplenishError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    pub fn duplicate(sku_id: SkuId, date: NaiveDate) -> Self {
        Self::StateInconsistency { sku_id, date }
    }
}

//! Strongly-typed SKU identifier.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::ReplenishError;

const PREFIX: &str = "SKU_";

/// Identifier of a stock-keeping unit.
///
/// Wraps the 1-based catalog index and renders as `SKU_001`. Ordering is
/// numeric, so `SKU_1000` sorts after `SKU_999`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SkuId(u32);

impl SkuId {
    pub fn from_index(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for SkuId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{PREFIX}{:03}", self.0)
    }
}

impl FromStr for SkuId {
    type Err = ReplenishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix(PREFIX).ok_or_else(|| {
            ReplenishError::invalid_record(format!("SkuId: missing prefix in {s:?}"))
        })?;
        let index = digits
            .parse::<u32>()
            .map_err(|e| ReplenishError::invalid_record(format!("SkuId: {s:?}: {e}")))?;
        Ok(Self(index))
    }
}

impl TryFrom<String> for SkuId {
    type Error = ReplenishError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SkuId> for String {
    fn from(value: SkuId) -> Self {
        value.to_string()
    }
}

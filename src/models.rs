use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One mid-price observation: the WETH-per-gETH mid quote at a point in time.
///
/// Source rows carry additional columns (mint/redeem legs, symbols, period
/// expiration); only the timestamp and the mid are read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidPriceRecord {
    pub timestamp: DateTime<Utc>,
    pub mid: f64,
}

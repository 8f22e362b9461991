use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily close for one ticker, keyed by the exchange-local calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

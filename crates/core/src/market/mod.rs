pub mod yahoo;

use crate::domain::PricePoint;

pub use yahoo::YahooChartClient;

#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    /// Daily closes over the trailing five-day window, oldest first.
    async fn daily_closes(&self, ticker: &str) -> anyhow::Result<Vec<PricePoint>>;
}

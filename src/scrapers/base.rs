use crate::models::price::DailyClose;
use crate::errors::Result;
use async_trait::async_trait;

/// Base trait for daily price sources
#[async_trait]
pub trait PriceSource {
    /// Name of the provider, used in logs
    fn source_name(&self) -> &'static str;

    /// Fetch daily closes for `symbol` over a period of `days` days.
    /// Returns closes sorted by date ascending; an empty history is an error.
    async fn fetch_daily_closes(&self, symbol: &str, days: u32) -> Result<Vec<DailyClose>>;
}

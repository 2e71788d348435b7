use crate::errors::{Result, DashboardError};
use crate::models::display::{MAX_LOOKBACK_DAYS, MIN_LOOKBACK_DAYS};
use crate::models::price::PriceTable;
use crate::models::ticker::TickerMap;
use crate::scrapers::base::PriceSource;
use crate::services::cache::{CacheKey, PriceCache};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::task::JoinSet;

/// 数据服务，负责抓取、裁剪并拼装价格宽表
pub struct DataService {
    source: Arc<dyn PriceSource + Send + Sync>,
    cache: PriceCache,
}

impl DataService {
    /// 创建新的数据服务实例，缓存随实例存在
    pub fn new(source: Arc<dyn PriceSource + Send + Sync>) -> Self {
        Self {
            source,
            cache: PriceCache::new(),
        }
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    /// 获取最近 `days` 天的价格表，相同输入直接走缓存
    pub async fn get_data(&self, days: u32, tickers: &TickerMap) -> Result<Arc<PriceTable>> {
        if !(MIN_LOOKBACK_DAYS..=MAX_LOOKBACK_DAYS).contains(&days) {
            return Err(DashboardError::ConfigError(format!(
                "Look-back window must be between {} and {} days, got {}",
                MIN_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS, days
            )));
        }
        if tickers.is_empty() {
            return Err(DashboardError::ConfigError("Ticker map must not be empty".to_string()));
        }

        let key = CacheKey::new(days, tickers);
        self.cache
            .get_or_fetch(key, || self.fetch_table(days, tickers))
            .await
    }

    /// 并发抓取所有代码，任意一只失败则整体失败
    async fn fetch_table(&self, days: u32, tickers: &TickerMap) -> Result<PriceTable> {
        info!("Fetching {} tickers from {} for {} days",
              tickers.len(), self.source.source_name(), days);

        let mut tasks = JoinSet::new();
        for (company, symbol) in tickers {
            let source = Arc::clone(&self.source);
            let company = company.clone();
            let symbol = symbol.clone();
            tasks.spawn(async move {
                let closes = source.fetch_daily_closes(&symbol, days).await;
                (company, symbol, closes)
            });
        }

        let mut table = PriceTable::new();
        while let Some(joined) = tasks.join_next().await {
            let (company, symbol, closes) =
                joined.map_err(|e| DashboardError::Unknown(e.to_string()))?;

            let closes = match closes {
                Ok(closes) => closes,
                Err(e) => {
                    warn!("Failed to fetch {} ({}): {}", company, symbol, e);
                    return Err(e);
                }
            };
            if closes.is_empty() {
                return Err(DashboardError::DataSourceError(format!(
                    "{}: no price data returned", symbol
                )));
            }

            table.insert_row(&company, &closes)?;
        }

        // 先合并再按统一的日期集合裁剪，某只股票缺一天不会让窗口整体前移
        if table.num_columns() > days as usize {
            debug!("Trimming {} merged dates to latest {}", table.num_columns(), days);
            table.retain_latest(days as usize);
        }

        info!("Built price table: {} companies x {} dates",
              table.num_rows(), table.num_columns());
        Ok(table)
    }
}

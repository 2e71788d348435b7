use log::{info, warn};
use serde_json::Value;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::Result;
use crate::models::display::DisplayConfig;
use crate::models::price::{LongRecord, PriceTable};
use crate::models::ticker::TickerMap;
use crate::scrapers::base::PriceSource;
use crate::scrapers::yahoo::YahooScraper;
use crate::services::cache::PriceCache;
use crate::services::chart_service;
use crate::services::data_service::DataService;

/// 一次渲染的结果：筛选后的宽表、长表记录和图表描述
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub table: PriceTable,
    pub records: Vec<LongRecord>,
    pub chart: Value,
}

/// 看板会话，持有代码映射和本会话的价格缓存
pub struct Dashboard {
    tickers: TickerMap,
    data_service: DataService,
}

impl Dashboard {
    /// 使用 Yahoo 数据源创建会话
    pub fn new(config: Config) -> Result<Self> {
        let scraper = YahooScraper::new(&config)?;
        Ok(Self::with_source(config.tickers, Arc::new(scraper)))
    }

    /// 使用任意数据源创建会话
    pub fn with_source(tickers: TickerMap, source: Arc<dyn PriceSource + Send + Sync>) -> Self {
        Self {
            tickers,
            data_service: DataService::new(source),
        }
    }

    pub fn tickers(&self) -> &TickerMap {
        &self.tickers
    }

    pub fn cache(&self) -> &PriceCache {
        self.data_service.cache()
    }

    /// 全部公司的价格表
    pub async fn get_data(&self, days: u32) -> Result<Arc<PriceTable>> {
        self.data_service.get_data(days, &self.tickers).await
    }

    /// 抓取、筛选、展开并生成图表；任何一步失败都以错误返回，由前端决定提示文案
    pub async fn render(&self, display: &DisplayConfig) -> Result<DashboardView> {
        let result = self.render_inner(display).await;
        if let Err(e) = &result {
            warn!("Render failed ({:?}): {}", e.kind(), e);
        }
        result
    }

    async fn render_inner(&self, display: &DisplayConfig) -> Result<DashboardView> {
        display.validate()?;

        let table = self.get_data(display.lookback_days).await?;
        let selected = chart_service::select_companies(&table, &display.selected_companies)?;
        let records = chart_service::flatten(&selected);
        let chart = chart_service::chart_spec(&records, display.y_min, display.y_max)?;

        info!("Rendered {} companies, {} records", selected.num_rows(), records.len());
        Ok(DashboardView {
            table: selected,
            records,
            chart,
        })
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use stock_price_board::errors::{DashboardError, Result};
use stock_price_board::scrapers::base::PriceSource;
use stock_price_board::DailyClose;

/// 按日历日连续生成收盘价的假数据源，记录调用次数
pub struct FakeSource {
    end: NaiveDate,
    extra_days: u32,
    calls: AtomicUsize,
    gaps: HashMap<String, NaiveDate>,
    failing: HashSet<String>,
    requested: Mutex<Vec<(String, u32)>>,
}

impl FakeSource {
    pub fn ending(end: NaiveDate) -> Self {
        Self {
            end,
            extra_days: 0,
            calls: AtomicUsize::new(0),
            gaps: HashMap::new(),
            failing: HashSet::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// 返回比请求多的天数，用来检验裁剪
    pub fn with_extra_days(mut self, extra: u32) -> Self {
        self.extra_days = extra;
        self
    }

    pub fn with_gap(mut self, symbol: &str, date: NaiveDate) -> Self {
        self.gaps.insert(symbol.to_string(), date);
        self
    }

    pub fn failing_on(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<(String, u32)> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PriceSource for FakeSource {
    fn source_name(&self) -> &'static str {
        "Fake"
    }

    async fn fetch_daily_closes(&self, symbol: &str, days: u32) -> Result<Vec<DailyClose>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push((symbol.to_string(), days));

        if self.failing.contains(symbol) {
            return Err(DashboardError::DataSourceError(format!("{}: no price data returned", symbol)));
        }

        let base = symbol.bytes().map(f64::from).sum::<f64>();
        let total = days + self.extra_days;
        Ok((0..total)
            .map(|i| self.end - Duration::days(i64::from(total - 1 - i)))
            .filter(|date| self.gaps.get(symbol) != Some(date))
            .enumerate()
            .map(|(i, date)| DailyClose { date, close: base + i as f64 })
            .collect())
    }
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

//! 按 (回看天数, 代码列表) 记忆的价格表缓存

use crate::errors::Result;
use crate::models::price::PriceTable;
use crate::models::ticker::TickerMap;
use log::debug;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// 缓存键：回看天数加排序后的 (公司名, 代码) 列表
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub lookback_days: u32,
    pub tickers: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(lookback_days: u32, tickers: &TickerMap) -> Self {
        Self {
            lookback_days,
            tickers: tickers.sorted_pairs(),
        }
    }
}

/// 每个键一个 `OnceCell`，同一个键的初始化互斥
type Slot = Arc<OnceCell<Arc<PriceTable>>>;

/// 会话级缓存，无淘汰策略；失败的抓取不会写入
#[derive(Default)]
pub struct PriceCache {
    entries: Mutex<HashMap<CacheKey, Slot>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl PriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 命中则直接返回，否则调用 `fetcher` 并写入缓存。
    ///
    /// 表锁只在取槽位时短暂持有；抓取期间只锁住对应键的槽位，
    /// 同一个键的并发请求只会触发一次抓取，其它键的查询不受影响。
    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetcher: F) -> Result<Arc<PriceTable>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PriceTable>>,
    {
        let slot = {
            let mut entries = self.entries.lock().await;
            Arc::clone(entries.entry(key.clone()).or_default())
        };

        let fetched = AtomicBool::new(false);
        let table = slot
            .get_or_try_init(|| {
                fetched.store(true, Ordering::Relaxed);
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache miss for {} days / {} tickers", key.lookback_days, key.tickers.len());
                async move { fetcher().await.map(Arc::new) }
            })
            .await?;

        if !fetched.load(Ordering::Relaxed) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!("Cache hit for {} days / {} tickers", key.lookback_days, key.tickers.len());
        }
        Ok(Arc::clone(table))
    }

    /// 已缓存的表数量，不含抓取失败或仍在抓取的槽位
    pub async fn len(&self) -> usize {
        self.entries
            .lock()
            .await
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

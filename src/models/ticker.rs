use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::errors::{DashboardError, Result};

/// 公司显示名到交易代码的固定映射，按公司名排序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerMap {
    entries: BTreeMap<String, String>,
}

impl TickerMap {
    /// 从 (公司名, 代码) 列表构建，公司名重复或列表为空时报错
    pub fn from_pairs<I, N, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: Into<String>,
    {
        let mut entries = BTreeMap::new();
        for (name, symbol) in pairs {
            let name = name.into().trim().to_string();
            let symbol = symbol.into().trim().to_uppercase();
            if name.is_empty() || symbol.is_empty() {
                return Err(DashboardError::ConfigError(
                    "Ticker entries need both a company name and a symbol".to_string(),
                ));
            }
            if entries.insert(name.clone(), symbol).is_some() {
                return Err(DashboardError::DuplicateCompany(name));
            }
        }

        if entries.is_empty() {
            return Err(DashboardError::ConfigError("Ticker map must not be empty".to_string()));
        }

        Ok(Self { entries })
    }

    /// 解析 `apple=AAPL,google=GOOGL` 形式的命令行参数
    pub fn parse(spec: &str) -> Result<Self> {
        let mut pairs = Vec::new();
        for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (name, symbol) = item.split_once('=').ok_or_else(|| {
                DashboardError::ConfigError(format!("Invalid ticker entry '{}', expected name=SYMBOL", item))
            })?;
            pairs.push((name.to_string(), symbol.to_string()));
        }
        Self::from_pairs(pairs)
    }

    pub fn symbol(&self, company: &str) -> Option<&str> {
        self.entries.get(company).map(String::as_str)
    }

    pub fn contains(&self, company: &str) -> bool {
        self.entries.contains_key(company)
    }

    pub fn companies(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 排序后的 (公司名, 代码) 列表，用作缓存键的一部分
    pub fn sorted_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(name, symbol)| (name.clone(), symbol.clone()))
            .collect()
    }
}

impl Default for TickerMap {
    fn default() -> Self {
        let entries = [
            ("apple", "AAPL"),
            ("facebook", "META"),
            ("google", "GOOGL"),
            ("microsoft", "MSFT"),
            ("netflix", "NFLX"),
            ("amazon", "AMZN"),
        ]
        .into_iter()
        .map(|(name, symbol)| (name.to_string(), symbol.to_string()))
        .collect();

        Self { entries }
    }
}

impl<'a> IntoIterator for &'a TickerMap {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::errors::{DashboardError, Result};
use crate::util::date_label;

/// 单日收盘价
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

/// 宽表：每家公司一行，每个日期一列
///
/// 列集合是所有行日期的并集，某行缺少的日期按缺失值处理。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    dates: BTreeSet<NaiveDate>,
    rows: BTreeMap<String, BTreeMap<NaiveDate, f64>>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把一只股票的收盘价序列转置成一行并入表中
    pub fn insert_row(&mut self, company: &str, series: &[DailyClose]) -> Result<()> {
        if self.rows.contains_key(company) {
            return Err(DashboardError::DuplicateCompany(company.to_string()));
        }

        let row: BTreeMap<NaiveDate, f64> = series.iter().map(|d| (d.date, d.close)).collect();
        self.dates.extend(row.keys().copied());
        self.rows.insert(company.to_string(), row);
        Ok(())
    }

    /// 公司名，按字母序
    pub fn companies(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// 日期列，按日历顺序
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }

    /// 日期列的显示标签，顺序与 `dates()` 一致
    pub fn column_labels(&self) -> Vec<String> {
        self.dates.iter().map(|d| date_label(*d)).collect()
    }

    pub fn contains(&self, company: &str) -> bool {
        self.rows.contains_key(company)
    }

    pub fn get(&self, company: &str, date: NaiveDate) -> Option<f64> {
        self.rows.get(company).and_then(|row| row.get(&date).copied())
    }

    /// 与日期列对齐的一整行，缺失值为 None
    pub fn row(&self, company: &str) -> Option<Vec<Option<f64>>> {
        let row = self.rows.get(company)?;
        Some(self.dates.iter().map(|d| row.get(d).copied()).collect())
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 只保留合并后日期集合中最近的 `n` 个日期，所有行按同一截止日裁剪
    pub fn retain_latest(&mut self, n: usize) {
        if self.dates.len() <= n {
            return;
        }
        let cutoff = n.checked_sub(1).and_then(|i| self.dates.iter().rev().nth(i).copied());
        match cutoff {
            Some(cutoff) => self.dates = self.dates.split_off(&cutoff),
            None => self.dates.clear(),
        }
        for row in self.rows.values_mut() {
            row.retain(|date, _| self.dates.contains(date));
        }
    }

    /// 只保留给定公司的行；列集合保持不变
    pub(crate) fn project<'a, I>(&self, companies: I) -> Result<PriceTable>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut rows = BTreeMap::new();
        for company in companies {
            let row = self
                .rows
                .get(company)
                .ok_or_else(|| DashboardError::UnknownCompanyError(company.to_string()))?;
            rows.insert(company.to_string(), row.clone());
        }

        Ok(PriceTable {
            dates: self.dates.clone(),
            rows,
        })
    }
}

/// 长表记录：每个 (公司, 日期) 单元格一条
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRecord {
    pub company: String,
    pub date: NaiveDate,
    pub price: Option<f64>,
}

impl LongRecord {
    pub fn date_label(&self) -> String {
        date_label(self.date)
    }
}

use std::collections::BTreeSet;

use crate::errors::{DashboardError, Result};

pub const MIN_LOOKBACK_DAYS: u32 = 1;
pub const MAX_LOOKBACK_DAYS: u32 = 50;
pub const DEFAULT_LOOKBACK_DAYS: u32 = 20;
pub const PRICE_AXIS_MIN: f64 = 0.0;
pub const PRICE_AXIS_MAX: f64 = 3500.0;
pub const DEFAULT_SELECTION: [&str; 4] = ["google", "amazon", "facebook", "apple"];

/// 一次渲染所需的全部用户输入
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub lookback_days: u32,
    pub y_min: f64,
    pub y_max: f64,
    pub selected_companies: BTreeSet<String>,
}

impl DisplayConfig {
    pub fn new() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            y_min: PRICE_AXIS_MIN,
            y_max: PRICE_AXIS_MAX,
            selected_companies: DEFAULT_SELECTION.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    pub fn with_y_range(mut self, y_min: f64, y_max: f64) -> Self {
        self.y_min = y_min;
        self.y_max = y_max;
        self
    }

    pub fn with_selection<I, S>(mut self, companies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_companies = companies.into_iter().map(Into::into).collect();
        self
    }

    /// 检查回看天数和纵轴范围。选择集合的合法性在筛选阶段检查。
    pub fn validate(&self) -> Result<()> {
        if !(MIN_LOOKBACK_DAYS..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            return Err(DashboardError::ConfigError(format!(
                "Look-back window must be between {} and {} days, got {}",
                MIN_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS, self.lookback_days
            )));
        }

        if !self.y_min.is_finite() || !self.y_max.is_finite() {
            return Err(DashboardError::ConfigError("Price range must be finite".to_string()));
        }

        if self.y_min < PRICE_AXIS_MIN || self.y_max > PRICE_AXIS_MAX || self.y_min > self.y_max {
            return Err(DashboardError::ConfigError(format!(
                "Price range must satisfy {} <= min <= max <= {}, got [{}, {}]",
                PRICE_AXIS_MIN, PRICE_AXIS_MAX, self.y_min, self.y_max
            )));
        }

        Ok(())
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self::new()
    }
}

// 公开导出的模块，供外部使用
pub mod models;
pub mod dashboard;
pub mod errors;
pub mod config;
pub mod scrapers;
pub mod services;

#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::display::DisplayConfig;
pub use models::price::{DailyClose, LongRecord, PriceTable};
pub use models::ticker::TickerMap;
pub use dashboard::{Dashboard, DashboardView};
pub use errors::{Result, DashboardError, FailureKind};

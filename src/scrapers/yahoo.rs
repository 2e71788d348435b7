use crate::config::Config;
use crate::models::price::DailyClose;
use crate::errors::{Result, DashboardError};
use crate::scrapers::base::PriceSource;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use log::{debug, info};

/// Yahoo Finance 日线数据抓取器
pub struct YahooScraper {
    client: Client,
    base_url: String,
}

impl YahooScraper {
    /// 创建新的 Yahoo 抓取器
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| DashboardError::RequestError(e))?;

        Ok(Self {
            client,
            base_url: config.provider_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }
}

#[async_trait]
impl PriceSource for YahooScraper {
    fn source_name(&self) -> &'static str {
        "Yahoo"
    }

    async fn fetch_daily_closes(&self, symbol: &str, days: u32) -> Result<Vec<DailyClose>> {
        debug!("获取 {} 最近 {}d 的日线数据", symbol, days);

        let response = self.client
            .get(self.chart_url(symbol))
            .query(&[
                ("range", format!("{}d", days)),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        // 代码无效时 Yahoo 返回 404，但正文里仍带有 chart.error
        if !status.is_success() {
            let detail = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|json| chart_error_message(&json))
                .unwrap_or_else(|| format!("HTTP status {}", status));
            return Err(DashboardError::DataSourceError(format!("{}: {}", symbol, detail)));
        }

        let json: Value = serde_json::from_str(&text)?;
        let closes = parse_chart_response(symbol, &json)?;

        info!("{} 获取到 {} 条收盘价", symbol, closes.len());
        Ok(closes)
    }
}

fn chart_error_message(json: &Value) -> Option<String> {
    let error = json.get("chart")?.get("error")?;
    if error.is_null() {
        return None;
    }
    let code = error.get("code").and_then(|c| c.as_str()).unwrap_or("error");
    let description = error.get("description").and_then(|d| d.as_str()).unwrap_or_default();
    Some(format!("{} {}", code, description).trim().to_string())
}

/// 解析 chart 接口响应，只保留收盘价
///
/// 时间戳按交易所时区换算成日期；收盘价为 null 的点被跳过，
/// 同一日期出现多次时保留最后一个点（盘中实时点）。
pub fn parse_chart_response(symbol: &str, json: &Value) -> Result<Vec<DailyClose>> {
    if let Some(message) = chart_error_message(json) {
        return Err(DashboardError::DataSourceError(format!("{}: {}", symbol, message)));
    }

    let result = json
        .get("chart")
        .and_then(|c| c.get("result"))
        .and_then(|r| r.as_array())
        .and_then(|r| r.first())
        .ok_or_else(|| DashboardError::DataSourceError(format!("{}: empty chart result", symbol)))?;

    let tz: Tz = result
        .get("meta")
        .and_then(|m| m.get("exchangeTimezoneName"))
        .and_then(|t| t.as_str())
        .and_then(|t| t.parse().ok())
        .unwrap_or(Tz::UTC);

    let timestamps = result
        .get("timestamp")
        .and_then(|t| t.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();
    let closes = result
        .get("indicators")
        .and_then(|i| i.get("quote"))
        .and_then(|q| q.get(0))
        .and_then(|q| q.get("close"))
        .and_then(|c| c.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (ts, close) in timestamps.iter().zip(closes.iter()) {
        let (Some(ts), Some(close)) = (ts.as_i64(), close.as_f64()) else {
            continue;
        };
        let Some(utc) = DateTime::<Utc>::from_timestamp(ts, 0) else {
            continue;
        };
        by_date.insert(utc.with_timezone(&tz).date_naive(), close);
    }

    if by_date.is_empty() {
        return Err(DashboardError::DataSourceError(format!("{}: no price data returned", symbol)));
    }

    Ok(by_date
        .into_iter()
        .map(|(date, close)| DailyClose { date, close })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_closes_in_exchange_timezone() {
        // 第二个点是 2024-12-01 01:30 UTC，在纽约仍是 11 月 30 日
        let json = json!({
            "chart": {
                "result": [{
                    "meta": { "symbol": "AAPL", "exchangeTimezoneName": "America/New_York" },
                    "timestamp": [1732804200, 1733016600, 1733149800],
                    "indicators": { "quote": [{
                        "open": [234.8, 0.0, 237.3],
                        "close": [237.33, 238.00, 239.59]
                    }]}
                }],
                "error": null
            }
        });

        let closes = parse_chart_response("AAPL", &json).unwrap();
        assert_eq!(closes, vec![
            DailyClose { date: d(2024, 11, 28), close: 237.33 },
            DailyClose { date: d(2024, 11, 30), close: 238.00 },
            DailyClose { date: d(2024, 12, 2), close: 239.59 },
        ]);
    }

    #[test]
    fn null_closes_are_skipped() {
        let json = json!({
            "chart": { "result": [{
                "meta": { "exchangeTimezoneName": "America/New_York" },
                "timestamp": [1732804200, 1733149800],
                "indicators": { "quote": [{ "close": [null, 239.59] }] }
            }], "error": null }
        });

        let closes = parse_chart_response("AAPL", &json).unwrap();
        assert_eq!(closes.len(), 1);
        assert_eq!(closes[0].date, d(2024, 12, 2));
    }

    #[test]
    fn same_day_keeps_last_point() {
        let json = json!({
            "chart": { "result": [{
                "meta": { "exchangeTimezoneName": "America/New_York" },
                "timestamp": [1733149800, 1733169600],
                "indicators": { "quote": [{ "close": [239.0, 239.59] }] }
            }], "error": null }
        });

        let closes = parse_chart_response("AAPL", &json).unwrap();
        assert_eq!(closes, vec![DailyClose { date: d(2024, 12, 2), close: 239.59 }]);
    }

    #[test]
    fn chart_error_is_data_source_error() {
        let json = json!({
            "chart": { "result": null, "error": {
                "code": "Not Found",
                "description": "No data found, symbol may be delisted"
            }}
        });

        match parse_chart_response("XXXX", &json) {
            Err(DashboardError::DataSourceError(msg)) => {
                assert!(msg.starts_with("XXXX: Not Found"), "{}", msg);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn empty_history_is_data_source_error() {
        let json = json!({
            "chart": { "result": [{
                "meta": { "exchangeTimezoneName": "America/New_York" },
                "indicators": { "quote": [{}] }
            }], "error": null }
        });

        assert!(matches!(
            parse_chart_response("AAPL", &json),
            Err(DashboardError::DataSourceError(_))
        ));
    }

    #[test]
    fn chart_url_trims_trailing_slash() {
        let config = Config::new().with_provider_url("http://localhost:8080/");
        let scraper = YahooScraper::new(&config).unwrap();
        assert_eq!(scraper.chart_url("AAPL"), "http://localhost:8080/v8/finance/chart/AAPL");
    }
}

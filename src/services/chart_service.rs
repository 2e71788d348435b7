use crate::errors::{Result, DashboardError};
use crate::models::price::{LongRecord, PriceTable};
use crate::util::arrow_utils;
use serde_json::{json, Value};
use std::collections::BTreeSet;

pub const NAME_FIELD: &str = "Name";
pub const DATE_FIELD: &str = "Date";
/// 价格列在长表和图表中的显示名
pub const PRICE_FIELD: &str = "Stock Prices(USD)";

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// 按所选公司筛选宽表
pub fn select_companies(table: &PriceTable, selection: &BTreeSet<String>) -> Result<PriceTable> {
    if selection.is_empty() {
        return Err(DashboardError::NoSelectionError);
    }
    table.project(selection.iter().map(String::as_str))
}

/// 宽表转长表，按公司名再按日期升序
pub fn flatten(table: &PriceTable) -> Vec<LongRecord> {
    let mut records = Vec::with_capacity(table.num_rows() * table.num_columns());
    for company in table.companies() {
        for date in table.dates() {
            records.push(LongRecord {
                company: company.to_string(),
                date,
                price: table.get(company, date),
            });
        }
    }
    records
}

pub fn select_and_flatten(table: &PriceTable, selection: &BTreeSet<String>) -> Result<Vec<LongRecord>> {
    let selected = select_companies(table, selection)?;
    Ok(flatten(&selected))
}

/// 生成 Vega-Lite 折线图描述
///
/// 纵轴定义域固定为 `[y_min, y_max]`，超出范围的点由 `clip` 裁掉而不是扩展坐标轴。
pub fn chart_spec(records: &[LongRecord], y_min: f64, y_max: f64) -> Result<Value> {
    let batch = arrow_utils::long_records_to_record_batch(records)?;
    let values = arrow_utils::record_batch_to_json_rows(&batch)?;

    Ok(json!({
        "$schema": VEGA_LITE_SCHEMA,
        "data": { "values": values },
        "mark": { "type": "line", "opacity": 0.8, "clip": true },
        "encoding": {
            "x": { "field": DATE_FIELD, "type": "temporal" },
            "y": {
                "field": PRICE_FIELD,
                "type": "quantitative",
                "stack": null,
                "scale": { "domain": [y_min, y_max] }
            },
            "color": { "field": NAME_FIELD, "type": "nominal" }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::price::DailyClose;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample_table() -> PriceTable {
        let mut table = PriceTable::new();
        table.insert_row("google", &[
            DailyClose { date: d(2024, 12, 2), close: 171.49 },
            DailyClose { date: d(2024, 11, 29), close: 168.95 },
        ]).unwrap();
        table.insert_row("apple", &[
            DailyClose { date: d(2024, 11, 29), close: 237.33 },
        ]).unwrap();
        table
    }

    fn selection(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flatten_orders_by_company_then_date() {
        let records = select_and_flatten(&sample_table(), &selection(&["google", "apple"])).unwrap();
        let order: Vec<(&str, NaiveDate)> = records.iter().map(|r| (r.company.as_str(), r.date)).collect();
        assert_eq!(order, vec![
            ("apple", d(2024, 11, 29)),
            ("apple", d(2024, 12, 2)),
            ("google", d(2024, 11, 29)),
            ("google", d(2024, 12, 2)),
        ]);
        // apple 缺少 12 月 2 日
        assert_eq!(records[1].price, None);
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert!(matches!(
            select_companies(&sample_table(), &BTreeSet::new()),
            Err(DashboardError::NoSelectionError)
        ));
    }

    #[test]
    fn unknown_company_is_rejected() {
        assert!(matches!(
            select_companies(&sample_table(), &selection(&["apple", "tesla"])),
            Err(DashboardError::UnknownCompanyError(name)) if name == "tesla"
        ));
    }

    #[test]
    fn chart_uses_configured_domain() {
        let records = flatten(&sample_table());
        let spec = chart_spec(&records, 200.0, 210.0).unwrap();

        assert_eq!(spec["encoding"]["y"]["scale"]["domain"], json!([200.0, 210.0]));
        assert_eq!(spec["encoding"]["y"]["field"], PRICE_FIELD);
        assert_eq!(spec["mark"]["clip"], true);
        assert!(spec["encoding"]["y"]["stack"].is_null());
        assert_eq!(spec["data"]["values"].as_array().unwrap().len(), 4);
    }
}

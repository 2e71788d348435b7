use chrono::{Duration, NaiveDate};
use quickcheck_macros::quickcheck;
use std::collections::{BTreeMap, BTreeSet};
use stock_price_board::services::chart_service::{flatten, select_and_flatten};
use stock_price_board::{DailyClose, PriceTable};

fn build_table(rows: &[(u8, Vec<(u16, u16)>)]) -> PriceTable {
    let start = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();

    // 同名公司只保留最后一行
    let mut by_company: BTreeMap<String, Vec<DailyClose>> = BTreeMap::new();
    for (id, points) in rows {
        let series = points
            .iter()
            .map(|(offset, price)| DailyClose {
                date: start + Duration::days(i64::from(*offset % 400)),
                close: f64::from(*price) / 100.0,
            })
            .collect();
        by_company.insert(format!("company-{}", id), series);
    }

    let mut table = PriceTable::new();
    for (company, series) in &by_company {
        table.insert_row(company, series).unwrap();
    }
    table
}

#[quickcheck]
fn flatten_is_sorted_by_company_then_date(rows: Vec<(u8, Vec<(u16, u16)>)>) -> bool {
    let table = build_table(&rows);
    let records = flatten(&table);

    records.len() == table.num_rows() * table.num_columns()
        && records
            .windows(2)
            .all(|w| (w[0].company.as_str(), w[0].date) < (w[1].company.as_str(), w[1].date))
}

#[quickcheck]
fn selection_keeps_every_column(rows: Vec<(u8, Vec<(u16, u16)>)>) -> bool {
    let table = build_table(&rows);
    let Some(first) = table.companies().next().map(str::to_string) else {
        return true;
    };

    let selection: BTreeSet<String> = [first.clone()].into_iter().collect();
    let records = select_and_flatten(&table, &selection).unwrap();

    records.len() == table.num_columns()
        && records.iter().all(|r| r.company == first)
        && records.iter().filter(|r| r.price.is_some()).count()
            == table.row(&first).unwrap().iter().flatten().count()
}

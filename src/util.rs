use chrono::NaiveDate;

/// 表头和表格中展示的日期格式，例如 "01 January 2025"
pub const DATE_LABEL_FORMAT: &str = "%d %B %Y";

/// 图表数据中的日期格式，保证渲染端按时间解析
pub const CHART_DATE_FORMAT: &str = "%Y-%m-%d";

// 日期转换工具
pub fn date_label(date: NaiveDate) -> String {
    date.format(DATE_LABEL_FORMAT).to_string()
}

pub fn chart_date(date: NaiveDate) -> String {
    date.format(CHART_DATE_FORMAT).to_string()
}

// Arrow数据转换工具
pub mod arrow_utils {
    use crate::errors::{Result, DashboardError};
    use crate::models::price::{LongRecord, PriceTable};
    use crate::services::chart_service::{DATE_FIELD, NAME_FIELD, PRICE_FIELD};
    use super::chart_date;
    use arrow::record_batch::RecordBatch;
    use arrow_array::{ArrayRef, Float64Array, StringArray};
    use arrow_ipc::writer::FileWriter;
    use arrow_json::ArrayWriter;
    use arrow_schema::{DataType, Field, Schema};
    use log::info;
    use std::fs::File;
    use std::path::Path;
    use std::sync::Arc;

    /// 宽表转成 RecordBatch：`Name` 列加上每个日期一列
    pub fn price_table_to_record_batch(table: &PriceTable) -> Result<RecordBatch> {
        let labels = table.column_labels();

        let mut fields = Vec::with_capacity(labels.len() + 1);
        fields.push(Field::new(NAME_FIELD, DataType::Utf8, false));
        for label in &labels {
            fields.push(Field::new(label, DataType::Float64, true));
        }

        let names: Vec<&str> = table.companies().collect();
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(fields.len());
        columns.push(Arc::new(StringArray::from(names.clone())));

        // 先取出每行，再按列收集
        let rows: Vec<Vec<Option<f64>>> = names
            .iter()
            .map(|name| table.row(name).unwrap_or_default())
            .collect();
        for col in 0..labels.len() {
            let values: Vec<Option<f64>> = rows
                .iter()
                .map(|row| row.get(col).copied().flatten())
                .collect();
            columns.push(Arc::new(Float64Array::from(values)));
        }

        RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
            .map_err(|e| DashboardError::ArrowError(e.to_string()))
    }

    /// 长表记录转成 RecordBatch，列名与图表编码一致
    pub fn long_records_to_record_batch(records: &[LongRecord]) -> Result<RecordBatch> {
        let schema = Schema::new(vec![
            Field::new(NAME_FIELD, DataType::Utf8, false),
            Field::new(DATE_FIELD, DataType::Utf8, false),
            Field::new(PRICE_FIELD, DataType::Float64, true),
        ]);

        let names = StringArray::from_iter_values(records.iter().map(|r| r.company.as_str()));
        let dates = StringArray::from_iter_values(records.iter().map(|r| chart_date(r.date)));
        let prices: Float64Array = records.iter().map(|r| r.price).collect();

        RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(names), Arc::new(dates), Arc::new(prices)],
        )
        .map_err(|e| DashboardError::ArrowError(e.to_string()))
    }

    /// RecordBatch 序列化为 JSON 行数组，缺失值字段被省略
    pub fn record_batch_to_json_rows(batch: &RecordBatch) -> Result<Vec<serde_json::Value>> {
        let mut writer = ArrayWriter::new(Vec::new());
        writer.write(batch)
            .map_err(|e| DashboardError::ArrowError(e.to_string()))?;
        writer.finish()
            .map_err(|e| DashboardError::ArrowError(e.to_string()))?;

        let buf = writer.into_inner();
        // 空批次时 writer 不输出任何字节
        if buf.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&buf)?)
    }

    /// 将宽表保存为 Arrow IPC 文件
    pub fn save_price_table_to_arrow(table: &PriceTable, path: &Path) -> Result<()> {
        info!("Saving {} companies x {} dates to {}",
                 table.num_rows(), table.num_columns(), path.display());

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let batch = price_table_to_record_batch(table)?;
        let file = File::create(path)?;

        let mut writer = FileWriter::try_new(file, &batch.schema())
            .map_err(|e| DashboardError::ArrowError(e.to_string()))?;

        writer.write(&batch)
            .map_err(|e| DashboardError::ArrowError(e.to_string()))?;
        writer.finish()
            .map_err(|e| DashboardError::ArrowError(e.to_string()))?;

        Ok(())
    }
}

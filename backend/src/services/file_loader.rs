use crate::errors::{PipelineError, PipelineResult};
use crate::services::loader::RecordLoader;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::info;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Writes each table to `{dir}/{table}/{date}_{table}.csv`, truncating
/// whatever the file held. Columns follow the record field order.
pub struct CsvFileLoader {
    dir: PathBuf,
    date: Option<NaiveDate>,
}

impl CsvFileLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            date: None,
        }
    }

    /// Pins the file date instead of using today's (UTC).
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        let date = self.date.unwrap_or_else(|| Utc::now().date_naive());
        self.dir
            .join(table)
            .join(format!("{}_{table}.csv", date.format("%Y-%m-%d")))
    }
}

#[async_trait]
impl RecordLoader for CsvFileLoader {
    async fn load_table(&self, table: &str, rows: Vec<Value>) -> PipelineResult<usize> {
        let path = self.table_path(table);
        let contents = to_csv(&rows).map_err(|e| PipelineError::load(table, e))?;

        write_file(&path, contents)
            .await
            .map_err(|e| PipelineError::load(table, format!("{}: {e}", path.display())))?;

        info!("Saved {} rows to {}", rows.len(), path.display());
        Ok(rows.len())
    }
}

/// Header from the first row's keys; an empty table yields an empty file.
fn to_csv(rows: &[Value]) -> anyhow::Result<Vec<u8>> {
    let Some(first) = rows.first().and_then(Value::as_object) else {
        return Ok(Vec::new());
    };
    let mut writer = csv::Writer::from_writer(Vec::new());
    let columns: Vec<&String> = first.keys().collect();
    writer.write_record(&columns)?;

    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|column| match row.get(column.as_str()) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
            })
            .collect();
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing csv: {}", e.error()))
}

async fn write_file(path: &Path, contents: Vec<u8>) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await
}

use super::{rows_to_records, RecordSource};
use crate::{
    error::{DashError, DashResult},
    types::RawRecord,
};
use serde_json::Value;
use std::path::PathBuf;

/// A single worksheet exported as CSV. Every cell arrives as text.
pub struct CsvWorksheetSource {
    path: PathBuf,
    name: String,
    worksheet_index: usize,
}

impl CsvWorksheetSource {
    pub fn new(path: PathBuf, worksheet_index: usize) -> Self {
        Self {
            name: path.display().to_string(),
            path,
            worksheet_index,
        }
    }
}

impl RecordSource for CsvWorksheetSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&mut self) -> DashResult<Vec<RawRecord>> {
        // A CSV export only ever holds one worksheet.
        if self.worksheet_index != 0 {
            return Err(DashError::WorksheetOutOfRange {
                index: self.worksheet_index,
                available: 1,
            });
        }
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows: Vec<Vec<Value>> = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|cell| Value::String(cell.to_string())).collect());
        }
        Ok(rows_to_records(&headers, rows))
    }
}

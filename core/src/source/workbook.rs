use super::{rows_to_records, RecordSource};
use crate::{
    error::{DashError, DashResult},
    types::RawRecord,
};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Days, NaiveDate, NaiveTime};
use serde_json::Value;
use std::path::PathBuf;

/// A workbook file (xlsx, xlsm, xls, ods) read one worksheet at a time.
pub struct WorkbookSource {
    path: PathBuf,
    name: String,
    worksheet_index: usize,
}

impl WorkbookSource {
    pub fn new(path: PathBuf, worksheet_index: usize) -> Self {
        Self {
            name: path.display().to_string(),
            path,
            worksheet_index,
        }
    }
}

impl RecordSource for WorkbookSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&mut self) -> DashResult<Vec<RawRecord>> {
        let mut workbook = open_workbook_auto(&self.path)?;
        let sheet_names = workbook.sheet_names().to_owned();
        let sheet_name = sheet_names.get(self.worksheet_index).ok_or(
            DashError::WorksheetOutOfRange {
                index: self.worksheet_index,
                available: sheet_names.len(),
            },
        )?;
        let range = workbook.worksheet_range(sheet_name)?;
        log::debug!("workbook {}: reading sheet {sheet_name:?}", self.name);

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(header_text).collect(),
            None => return Ok(Vec::new()),
        };
        let data = rows.map(|row| row.iter().map(cell_value).collect::<Vec<_>>());
        Ok(rows_to_records(&headers, data))
    }
}

fn header_text(cell: &Data) -> String {
    match cell_value(cell) {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Map a cell the way a spreadsheet API hands values back: blanks become
/// empty text, whole numbers become integers, dates become ISO text.
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::String(String::new()),
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => number_value(*f),
        Data::String(s) => Value::String(s.clone()),
        Data::Error(e) => Value::String(e.to_string()),
        Data::DateTime(dt) => excel_serial_to_text(dt.as_f64())
            .map(Value::String)
            .unwrap_or_else(|| number_value(dt.as_f64())),
        Data::DateTimeIso(s) => Value::String(s.clone()),
        Data::DurationIso(s) => Value::String(s.clone()),
    }
}

fn number_value(f: f64) -> Value {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Value::from(f as i64)
    } else {
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string()))
    }
}

/// Excel serial (days since 1899-12-30) -> `YYYY-MM-DD[ HH:MM:SS]`.
fn excel_serial_to_text(serial: f64) -> Option<String> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let total_seconds = (serial * 86_400.0).round() as u64;
    let date = NaiveDate::from_ymd_opt(1899, 12, 30)?
        .checked_add_days(Days::new(total_seconds / 86_400))?;
    let seconds = (total_seconds % 86_400) as u32;
    if seconds == 0 {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)?;
    Some(date.and_time(time).format("%Y-%m-%d %H:%M:%S").to_string())
}

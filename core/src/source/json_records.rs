use super::RecordSource;
use crate::{
    error::{DashError, DashResult},
    types::RawRecord,
};
use serde::Deserialize;
use std::path::PathBuf;

/// Either one worksheet's records, or a list of worksheets.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonWorkbook {
    Sheet(Vec<RawRecord>),
    Sheets(Vec<Vec<RawRecord>>),
}

/// Records saved as a JSON array of objects, the shape a
/// "get all records" spreadsheet call returns.
pub struct JsonRecordSource {
    path: PathBuf,
    name: String,
    worksheet_index: usize,
}

impl JsonRecordSource {
    pub fn new(path: PathBuf, worksheet_index: usize) -> Self {
        Self {
            name: path.display().to_string(),
            path,
            worksheet_index,
        }
    }
}

impl RecordSource for JsonRecordSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&mut self) -> DashResult<Vec<RawRecord>> {
        let content = std::fs::read_to_string(&self.path)?;
        let mut sheets = match serde_json::from_str::<JsonWorkbook>(&content)? {
            JsonWorkbook::Sheet(records) => vec![records],
            JsonWorkbook::Sheets(sheets) => sheets,
        };
        let available = sheets.len();
        if self.worksheet_index >= available {
            return Err(DashError::WorksheetOutOfRange {
                index: self.worksheet_index,
                available,
            });
        }
        Ok(sheets.swap_remove(self.worksheet_index))
    }
}

//! Record sources.
//!
//! RULE: Only source modules touch files. The table loader calls
//! `fetch()` exactly once and never retries.

mod credentials;
mod csv_sheet;
mod json_records;
mod workbook;

pub use credentials::ServiceAccountKey;
pub use csv_sheet::CsvWorksheetSource;
pub use json_records::JsonRecordSource;
pub use workbook::WorkbookSource;

use crate::{
    config::SourceConfig,
    error::{DashError, DashResult},
    types::RawRecord,
};
use std::path::{Path, PathBuf};

/// Extensions tried, in order, when resolving a spreadsheet name.
pub const SPREADSHEET_EXTENSIONS: [&str; 6] = ["xlsx", "xlsm", "xls", "ods", "csv", "json"];

/// Anything that can hand over one worksheet as flat key-value rows.
pub trait RecordSource {
    /// Stable name used in logs and errors.
    fn name(&self) -> &str;

    /// Read the whole worksheet. Header row -> keys, later rows -> records.
    fn fetch(&mut self) -> DashResult<Vec<RawRecord>>;
}

/// Records already in memory. Used by tests and embedding hosts.
pub struct MemorySource {
    name: String,
    records: Vec<RawRecord>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, records: Vec<RawRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

impl RecordSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&mut self) -> DashResult<Vec<RawRecord>> {
        Ok(self.records.clone())
    }
}

/// Check credentials, locate the spreadsheet and pick a reader for it.
pub fn open_configured(config: &SourceConfig) -> DashResult<Box<dyn RecordSource>> {
    if let Some(path) = &config.credentials_path {
        let key = ServiceAccountKey::load(path)?;
        log::info!(
            "credentials: reading as {} (project {})",
            key.client_email,
            key.project_id.as_deref().unwrap_or("-")
        );
    }

    let path = resolve_spreadsheet(&config.workbook_dir, &config.spreadsheet_name)?;
    let index = config.worksheet_index;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    log::info!("source: {} worksheet {index}", path.display());

    let source: Box<dyn RecordSource> = match extension.as_str() {
        "csv" => Box::new(CsvWorksheetSource::new(path, index)),
        "json" => Box::new(JsonRecordSource::new(path, index)),
        _ => Box::new(WorkbookSource::new(path, index)),
    };
    Ok(source)
}

/// Find `<dir>/<name>` or `<dir>/<name>.<ext>` for the first supported extension.
pub fn resolve_spreadsheet(dir: &Path, name: &str) -> DashResult<PathBuf> {
    let exact = dir.join(name);
    if exact.is_file() {
        return Ok(exact);
    }
    SPREADSHEET_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{name}.{ext}")))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| DashError::SourceUnreachable {
            name: name.to_string(),
            reason: format!("no spreadsheet file in {}", dir.display()),
        })
}

/// Header cells -> keys, data cells -> values. Fully blank rows are skipped.
pub(crate) fn rows_to_records<I>(headers: &[String], rows: I) -> Vec<RawRecord>
where
    I: IntoIterator<Item = Vec<serde_json::Value>>,
{
    rows.into_iter()
        .filter(|cells| !cells.iter().all(is_blank))
        .map(|cells| {
            let mut record = RawRecord::new();
            let mut cells = cells.into_iter();
            for header in headers {
                let value = cells
                    .next()
                    .unwrap_or_else(|| serde_json::Value::String(String::new()));
                record.insert(header.clone(), value);
            }
            record
        })
        .collect()
}

fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

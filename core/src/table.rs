//! The immutable in-memory complaint table.
//!
//! Built once from a record source, read-only afterwards. Views borrow it
//! and refer to rows by index.

use crate::{
    error::{DashError, DashResult},
    record::{Record, REQUIRED_FIELDS},
    source::RecordSource,
    types::{RawRecord, RowIndex},
};

#[derive(Debug, Clone)]
pub struct Table {
    source_name: String,
    records: Vec<Record>,
}

impl Table {
    /// One fetch from `source`, then typed coercion of every row.
    pub fn load(source: &mut dyn RecordSource) -> DashResult<Self> {
        let name = source.name().to_string();
        let raw = source.fetch().map_err(|e| {
            log::error!("source {name}: fetch failed: {e}");
            e
        })?;
        log::info!("source {name}: fetched {} records", raw.len());
        Self::from_raw(name, raw)
    }

    /// Validate and coerce raw rows. Fails on an empty record set, on a
    /// required field no row carries, or on the first unparseable value.
    pub fn from_raw(source_name: impl Into<String>, raw: Vec<RawRecord>) -> DashResult<Self> {
        let source_name = source_name.into();
        if raw.is_empty() {
            return Err(DashError::EmptySource { name: source_name });
        }

        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|field| !raw.iter().any(|r| r.contains_key(**field)))
            .map(|field| field.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DashError::MissingFields { fields: missing });
        }

        let records = raw
            .iter()
            .enumerate()
            .map(|(i, r)| Record::from_raw(r, i + 1))
            .collect::<DashResult<Vec<_>>>()?;
        log::info!("table loaded: {} records from {source_name}", records.len());
        Ok(Self {
            source_name,
            records,
        })
    }

    /// Build from already-typed records.
    pub fn from_records(source_name: impl Into<String>, records: Vec<Record>) -> DashResult<Self> {
        let source_name = source_name.into();
        if records.is_empty() {
            return Err(DashError::EmptySource { name: source_name });
        }
        Ok(Self {
            source_name,
            records,
        })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, row: RowIndex) -> Option<&Record> {
        self.records.get(row)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

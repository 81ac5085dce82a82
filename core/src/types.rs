//! Shared primitive types used across the whole pipeline.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a record inside the loaded table. Stable for the table's lifetime.
pub type RowIndex = usize;

/// Numeric complaint identifier.
pub type ComplaintId = i64;

/// One raw row as handed over by a record source: header name -> cell value.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Calendar month bucket. Orders chronologically (year, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_month_orders_across_year_boundary() {
        let dec = YearMonth::new(2022, 12);
        let jan = YearMonth::new(2023, 1);
        assert!(dec < jan);
        assert_eq!(jan.to_string(), "2023-01");
    }

    #[test]
    fn year_month_of_date_drops_day() {
        let date = NaiveDate::from_ymd_opt(2023, 2, 28).unwrap();
        assert_eq!(YearMonth::of(date), YearMonth::new(2023, 2));
    }
}

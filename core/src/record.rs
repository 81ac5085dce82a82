//! Typed complaint records and the one-shot coercion from raw rows.
//!
//! Coercion happens exactly once, at load. Text fields are best-effort;
//! `date_received` and `complaint_id` must parse or the whole load fails.

use crate::{
    error::{DashError, DashResult},
    types::{ComplaintId, RawRecord, YearMonth},
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FIELD_COMPLAINT_ID: &str = "complaint_id";
pub const FIELD_STATE: &str = "state";
pub const FIELD_COMPANY_RESPONSE: &str = "company_response";
pub const FIELD_TIMELY: &str = "timely";
pub const FIELD_PRODUCT: &str = "product";
pub const FIELD_DATE_RECEIVED: &str = "date_received";
pub const FIELD_SUBMITTED_VIA: &str = "submitted_via";
pub const FIELD_ISSUE: &str = "issue";
pub const FIELD_SUB_ISSUE: &str = "sub_issue";

/// Fields at least one record must carry for the table to load.
pub const REQUIRED_FIELDS: [&str; 8] = [
    FIELD_STATE,
    FIELD_COMPANY_RESPONSE,
    FIELD_TIMELY,
    FIELD_PRODUCT,
    FIELD_SUBMITTED_VIA,
    FIELD_DATE_RECEIVED,
    FIELD_ISSUE,
    FIELD_COMPLAINT_ID,
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub complaint_id: ComplaintId,
    pub state: String,
    pub company_response: String,
    pub timely: bool,
    pub product: String,
    pub date_received: NaiveDate,
    pub submitted_via: String,
    pub issue: String,
    pub sub_issue: Option<String>,
}

impl Record {
    /// Coerce one raw row. `record` is the 1-based position used in errors.
    pub fn from_raw(raw: &RawRecord, record: usize) -> DashResult<Self> {
        Ok(Self {
            complaint_id: coerce_id(raw.get(FIELD_COMPLAINT_ID), record)?,
            state: text(raw.get(FIELD_STATE)),
            company_response: text(raw.get(FIELD_COMPANY_RESPONSE)),
            timely: text(raw.get(FIELD_TIMELY)) == "Yes",
            product: text(raw.get(FIELD_PRODUCT)),
            date_received: coerce_date(raw.get(FIELD_DATE_RECEIVED), record)?,
            submitted_via: text(raw.get(FIELD_SUBMITTED_VIA)),
            issue: text(raw.get(FIELD_ISSUE)),
            sub_issue: Some(text(raw.get(FIELD_SUB_ISSUE))).filter(|s| !s.is_empty()),
        })
    }

    /// Case-sensitive substring match on the company response.
    pub fn is_closed(&self) -> bool {
        self.company_response.contains("Closed")
    }

    pub fn is_in_progress(&self) -> bool {
        self.company_response == "In Progress"
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.date_received)
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn coerce_id(value: Option<&Value>, record: usize) -> DashResult<ComplaintId> {
    let parsed = match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(integral_f64)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_f64))
        }
        _ => None,
    };
    parsed.ok_or_else(|| {
        let err = DashError::Parse {
            record,
            field: FIELD_COMPLAINT_ID,
            value: text(value),
        };
        log::error!("{err}");
        err
    })
}

fn integral_f64(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn coerce_date(value: Option<&Value>, record: usize) -> DashResult<NaiveDate> {
    let parsed = match value {
        Some(Value::String(s)) => parse_date(s),
        _ => None,
    };
    parsed.ok_or_else(|| {
        let err = DashError::Parse {
            record,
            field: FIELD_DATE_RECEIVED,
            value: text(value),
        };
        log::error!("{err}");
        err
    })
}

/// Parse the date formats worksheets commonly carry. Time parts are dropped.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(date);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt.date());
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_supported_date_shapes() {
        assert_eq!(parse_date("2023-01-05"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("01/05/2023"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("2023/01/05"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date(" 2023-01-05 10:30:00 "), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("2023-01-05T23:59:59"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("2023-01-05T10:00:00+02:00"), Some(ymd(2023, 1, 5)));
    }

    #[test]
    fn parses_fractional_seconds_and_minute_precision() {
        assert_eq!(parse_date("2023-01-05 10:30:00.123"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("2023-01-05T10:30:00.5"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("2023-01-05 10:30"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("1/5/2023 10:30"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("01/05/2023 10:30:15"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("01/05/2023 10:30:15.250"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("1/5/2023"), Some(ymd(2023, 1, 5)));
        assert_eq!(parse_date("2023-1-5"), Some(ymd(2023, 1, 5)));
    }

    #[test]
    fn rejects_unparseable_dates() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2023-13-01"), None);
        assert_eq!(parse_date("last tuesday"), None);
    }

    #[test]
    fn coerces_mixed_cell_types() {
        let record = Record::from_raw(
            &raw(json!({
                "complaint_id": "42",
                "state": "CO",
                "company_response": "Closed with explanation",
                "timely": "Yes",
                "product": 7,
                "date_received": "2023-01-05",
                "submitted_via": "Web",
                "issue": "Billing",
                "sub_issue": ""
            })),
            1,
        )
        .unwrap();
        assert_eq!(record.complaint_id, 42);
        assert_eq!(record.product, "7");
        assert!(record.timely);
        assert!(record.is_closed());
        assert!(!record.is_in_progress());
        assert_eq!(record.sub_issue, None);
        assert_eq!(record.month(), YearMonth::new(2023, 1));
    }

    #[test]
    fn timely_requires_exact_yes() {
        let record = Record::from_raw(
            &raw(json!({
                "complaint_id": 1.0,
                "timely": "yes",
                "date_received": "2023-01-05"
            })),
            1,
        )
        .unwrap();
        assert_eq!(record.complaint_id, 1);
        assert!(!record.timely);
        assert_eq!(record.state, "");
    }

    #[test]
    fn bad_identifier_is_a_parse_error() {
        let err = Record::from_raw(
            &raw(json!({ "complaint_id": "CFPB-1", "date_received": "2023-01-05" })),
            4,
        )
        .unwrap_err();
        match err {
            DashError::Parse { record, field, value } => {
                assert_eq!(record, 4);
                assert_eq!(field, FIELD_COMPLAINT_ID);
                assert_eq!(value, "CFPB-1");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn missing_date_is_a_parse_error() {
        let err = Record::from_raw(&raw(json!({ "complaint_id": 9 })), 2).unwrap_err();
        assert!(matches!(
            err,
            DashError::Parse { field: FIELD_DATE_RECEIVED, .. }
        ));
    }
}

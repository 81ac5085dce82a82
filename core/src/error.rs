use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Source '{name}' unreachable: {reason}")]
    SourceUnreachable { name: String, reason: String },

    #[error("Source '{name}' returned no records")]
    EmptySource { name: String },

    #[error("Required fields absent from every record: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("Invalid credentials at {path}: {reason}")]
    InvalidCredentials { path: String, reason: String },

    #[error("Worksheet index {index} out of range ({available} available)")]
    WorksheetOutOfRange { index: usize, available: usize },

    #[error("Record {record}: cannot parse {field} from {value:?}")]
    Parse {
        record: usize,
        field: &'static str,
        value: String,
    },

    #[error("No complaints match the current selection")]
    EmptyView,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type DashResult<T> = Result<T, DashError>;

/// The three failure classes a user can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCategory {
    LoadError,
    ParseError,
    EmptyViewError,
}

impl ErrorCategory {
    /// Fatal categories abort startup; an empty view only degrades the page.
    pub fn is_fatal(self) -> bool {
        !matches!(self, ErrorCategory::EmptyViewError)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorCategory::LoadError => "LoadError",
            ErrorCategory::ParseError => "ParseError",
            ErrorCategory::EmptyViewError => "EmptyViewError",
        };
        f.write_str(label)
    }
}

impl DashError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashError::Parse { .. } => ErrorCategory::ParseError,
            DashError::EmptyView => ErrorCategory::EmptyViewError,
            DashError::SourceUnreachable { .. }
            | DashError::EmptySource { .. }
            | DashError::MissingFields { .. }
            | DashError::InvalidCredentials { .. }
            | DashError::WorksheetOutOfRange { .. }
            | DashError::Io(_)
            | DashError::Csv(_)
            | DashError::Workbook(_)
            | DashError::Serialization(_)
            | DashError::Other(_) => ErrorCategory::LoadError,
        }
    }
}

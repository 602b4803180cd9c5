//! Error types for the amr-surveillance library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum AmrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid {field} value '{value}' at row {row} (isolate '{id}'): expected YES or NO")]
    InvalidFlag {
        row: usize,
        id: String,
        field: String,
        value: String,
    },

    #[error("Invalid MAR index '{value}' at row {row} (isolate '{id}'): must be a number in [0, 1]")]
    InvalidMarIndex { row: usize, id: String, value: String },

    #[error(
        "Invalid susceptibility call '{value}' for {antibiotic} at row {row} (isolate '{id}'): expected S, I, R, SDD or blank"
    )]
    InvalidCall {
        row: usize,
        id: String,
        antibiotic: String,
        value: String,
    },

    #[error("Antibiotic '{antibiotic}' recorded twice at row {row} (isolate '{id}')")]
    DuplicateAntibiotic {
        row: usize,
        id: String,
        antibiotic: String,
    },

    #[error("Missing required column(s): {0}")]
    MissingColumn(String),

    #[error("Column '{0}' appears more than once in the header")]
    DuplicateColumn(String),

    #[error("Column {column} has a blank header but holds '{value}' at row {row}")]
    BlankHeader {
        column: usize,
        row: usize,
        value: String,
    },

    #[error("Row {row} (isolate '{id}') has {found} fields, header has {expected}")]
    RowLength {
        row: usize,
        id: String,
        expected: usize,
        found: usize,
    },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AmrError {
    /// Check if this error was raised while validating input rows.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidFlag { .. }
                | Self::InvalidMarIndex { .. }
                | Self::InvalidCall { .. }
                | Self::DuplicateAntibiotic { .. }
                | Self::MissingColumn(_)
                | Self::DuplicateColumn(_)
                | Self::BlankHeader { .. }
                | Self::RowLength { .. }
        )
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, AmrError>;

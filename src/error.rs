//! Error types for hypnoflux

use thiserror::Error;

/// Which raw field of a row failed to coerce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    Timestamp,
    SleepStage,
}

impl RowField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowField::Timestamp => "timestamp",
            RowField::SleepStage => "sleep_stage",
        }
    }
}

impl std::fmt::Display for RowField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while shaping a sleep-stage series
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("Malformed row {row}: field `{field}` has value {value:?}")]
    MalformedRow {
        row: usize,
        field: RowField,
        value: String,
    },

    #[error("Row {row}: stage id {stage_id} has no label in the taxonomy")]
    UnknownStage { row: usize, stage_id: usize },

    #[error("Empty series: {0}")]
    EmptySeries(String),

    #[error("Invalid taxonomy: {0}")]
    InvalidTaxonomy(String),

    #[error("Palette has {colors} colors but {labels} labels need one")]
    PaletteTooShort { colors: usize, labels: usize },

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse input: {0}")]
    ParseError(String),
}

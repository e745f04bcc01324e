//! Readers turning CSV / JSON text into raw rows

use crate::error::ShapeError;
use crate::schema::raw_row::{RawRow, RawValue};
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Supported input encodings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Comma-separated with a header row
    #[default]
    Csv,
    /// JSON array of row objects
    Json,
    /// Newline-delimited JSON (one row object per line)
    Ndjson,
}

/// CSV fields are kept as text and coerced later
#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    sleep_stage: String,
}

impl From<CsvRow> for RawRow {
    fn from(row: CsvRow) -> Self {
        RawRow {
            timestamp: RawValue::Text(row.timestamp),
            sleep_stage: RawValue::Text(row.sleep_stage),
        }
    }
}

/// Reader for raw hypnogram rows
pub struct RawRowReader;

impl RawRowReader {
    /// Parse input text in the given format
    pub fn parse(input: &str, format: InputFormat) -> Result<Vec<RawRow>, ShapeError> {
        match format {
            InputFormat::Csv => Self::parse_csv(input),
            InputFormat::Json => Self::parse_array(input),
            InputFormat::Ndjson => Self::parse_ndjson(input),
        }
    }

    /// Parse CSV text with a `timestamp,sleep_stage` header (extra columns ignored)
    pub fn parse_csv(csv_text: &str) -> Result<Vec<RawRow>, ShapeError> {
        Self::read_csv(csv_text.as_bytes())
    }

    /// Read CSV from any reader
    pub fn read_csv<R: Read>(reader: R) -> Result<Vec<RawRow>, ShapeError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.deserialize::<CsvRow>() {
            rows.push(record?.into());
        }
        Ok(rows)
    }

    /// Parse a JSON array of rows
    pub fn parse_array(json: &str) -> Result<Vec<RawRow>, ShapeError> {
        let rows: Vec<RawRow> = serde_json::from_str(json)?;
        Ok(rows)
    }

    /// Parse NDJSON (newline-delimited JSON) rows
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<RawRow>, ShapeError> {
        let mut rows = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawRow>(trimmed) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    return Err(ShapeError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(rows)
    }
}

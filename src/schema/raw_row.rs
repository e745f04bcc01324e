//! Raw hypnogram row
//!
//! Rows come straight from a CSV export or a JSON dump, so both fields may be
//! numbers or numeric text. Nothing is coerced here; the normalizer decides
//! what is valid.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column holding epoch seconds
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Column holding the integer stage id
pub const SLEEP_STAGE_COLUMN: &str = "sleep_stage";

/// Field value as found in the input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Number(v as f64)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl RawValue {
    /// Numeric value, parsing text; `None` for blank, non-numeric or non-finite input
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Non-negative integral value (`2`, `"2"` and `"2.0"` all give 2)
    pub fn as_index(&self) -> Option<usize> {
        let value = self.as_f64()?;
        if value < 0.0 || value.fract() != 0.0 || value > usize::MAX as f64 {
            return None;
        }
        Some(value as usize)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

/// One input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// Seconds since the Unix epoch
    pub timestamp: RawValue,
    /// Stage id, an index into the taxonomy labels
    pub sleep_stage: RawValue,
}

impl RawRow {
    pub fn new(timestamp: impl Into<RawValue>, sleep_stage: impl Into<RawValue>) -> Self {
        Self {
            timestamp: timestamp.into(),
            sleep_stage: sleep_stage.into(),
        }
    }
}

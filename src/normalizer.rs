//! Series normalization
//!
//! This module turns raw rows into typed samples:
//! - epoch seconds become millisecond timestamps
//! - stage codes become validated stage ids
//! - malformed rows are rejected or skipped, per policy
//!
//! Rows are never modified; a fresh sample sequence is returned.

use crate::error::{RowField, ShapeError};
use crate::schema::RawRow;
use crate::taxonomy::StageTaxonomy;
use crate::types::{NormalizationReport, NormalizedSeries, QualityFlag, Sample, SkippedRow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do with a row that cannot be coerced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedRowPolicy {
    /// Fail the whole series on the first bad row
    #[default]
    Reject,
    /// Drop bad rows and list them in the report
    Skip,
}

/// Normalizer for converting raw rows to samples
pub struct Normalizer;

impl Normalizer {
    /// Normalize raw rows against a taxonomy
    pub fn normalize(
        rows: &[RawRow],
        taxonomy: &StageTaxonomy,
        policy: MalformedRowPolicy,
    ) -> Result<NormalizedSeries, ShapeError> {
        let mut samples = Vec::with_capacity(rows.len());
        let mut report = NormalizationReport {
            rows_read: rows.len(),
            ..Default::default()
        };

        for (index, row) in rows.iter().enumerate() {
            match normalize_row(index, row, taxonomy) {
                Ok(sample) => samples.push(sample),
                Err(e) => match policy {
                    MalformedRowPolicy::Reject => return Err(e),
                    MalformedRowPolicy::Skip => {
                        warn!(row = index, error = %e, "skipping malformed row");
                        report.skipped.push(SkippedRow {
                            row: index,
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        if !report.skipped.is_empty() {
            report.flags.push(QualityFlag::SkippedRows);
        }

        // Order is checked, never repaired
        if samples.windows(2).any(|w| w[1].timestamp < w[0].timestamp) {
            warn!("sample timestamps are not in chronological order");
            report.flags.push(QualityFlag::OutOfOrder);
        }
        if samples.windows(2).any(|w| w[1].timestamp == w[0].timestamp) {
            report.flags.push(QualityFlag::DuplicateTimestamp);
        }

        report.rows_kept = samples.len();
        debug!(
            rows_read = report.rows_read,
            rows_kept = report.rows_kept,
            "normalized series"
        );

        Ok(NormalizedSeries { samples, report })
    }
}

fn normalize_row(
    index: usize,
    row: &RawRow,
    taxonomy: &StageTaxonomy,
) -> Result<Sample, ShapeError> {
    let timestamp = row
        .timestamp
        .as_f64()
        .and_then(seconds_to_datetime)
        .ok_or_else(|| ShapeError::MalformedRow {
            row: index,
            field: RowField::Timestamp,
            value: row.timestamp.to_string(),
        })?;

    let stage_id = row
        .sleep_stage
        .as_index()
        .ok_or_else(|| ShapeError::MalformedRow {
            row: index,
            field: RowField::SleepStage,
            value: row.sleep_stage.to_string(),
        })?;

    if stage_id >= taxonomy.stage_count() {
        return Err(ShapeError::UnknownStage {
            row: index,
            stage_id,
        });
    }

    Ok(Sample {
        timestamp,
        stage_id,
    })
}

/// Epoch seconds to a millisecond-resolution instant
fn seconds_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

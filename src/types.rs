//! Core types for the hypnoflux pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: normalized samples, stage runs, proportion vectors and the
//! first-occurrence lookup handed to the chart layer.

use crate::axes::AxisDomains;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped sleep-stage observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Observation time, millisecond resolution
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Index into the taxonomy label list
    pub stage_id: usize,
}

/// Data quality flags raised while normalizing a series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    /// At least one row was dropped under the skip policy
    SkippedRows,
    /// Timestamps are not non-decreasing; the series is kept as given
    OutOfOrder,
    /// Two consecutive samples share a timestamp
    DuplicateTimestamp,
}

impl QualityFlag {
    /// Wire name, identical to the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityFlag::SkippedRows => "skipped_rows",
            QualityFlag::OutOfOrder => "out_of_order",
            QualityFlag::DuplicateTimestamp => "duplicate_timestamp",
        }
    }
}

impl std::fmt::Display for QualityFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row dropped by the normalizer and the reason it was dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Zero-based row index in the input
    pub row: usize,
    pub reason: String,
}

/// Summary of what the normalizer did with its input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub skipped: Vec<SkippedRow>,
    pub flags: Vec<QualityFlag>,
}

/// Normalized series ready for aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSeries {
    pub samples: Vec<Sample>,
    pub report: NormalizationReport,
}

impl NormalizedSeries {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&Sample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }
}

/// Maximal block of consecutive samples sharing one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    pub stage_label: String,
    /// Position of `stage_label` in the taxonomy display order
    pub display_order_index: usize,
    /// Share of the night, in percent of the portion base
    pub portion_percent: f64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    /// Timestamp of the closing sample (inclusive)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end_time: DateTime<Utc>,
}

/// Fraction of samples per stage, indexed by display-order position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageProportions {
    /// Labels in display order; `fractions[j]` belongs to `labels[j]`
    pub labels: Vec<String>,
    pub fractions: Vec<f64>,
}

impl StageProportions {
    /// Fraction for a display-order slot
    pub fn get(&self, slot: usize) -> Option<f64> {
        self.fractions.get(slot).copied()
    }

    /// Fraction for a label
    pub fn for_label(&self, label: &str) -> Option<f64> {
        let slot = self.labels.iter().position(|l| l == label)?;
        self.get(slot)
    }

    pub fn sum(&self) -> f64 {
        self.fractions.iter().sum()
    }
}

/// Index of the first run of each stage, by display-order slot
///
/// Serialized with `-1` in place of missing stages, which is what the chart
/// code indexes against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<i64>", from = "Vec<i64>")]
pub struct FirstOccurrences(pub Vec<Option<usize>>);

/// Sentinel used for a stage that never occurs
pub const NOT_FOUND: i64 = -1;

impl FirstOccurrences {
    pub fn get(&self, slot: usize) -> Option<usize> {
        self.0.get(slot).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Slots as indices with [`NOT_FOUND`] for missing stages
    pub fn to_sentinel_indices(&self) -> Vec<i64> {
        self.0
            .iter()
            .map(|slot| slot.map_or(NOT_FOUND, |i| i as i64))
            .collect()
    }
}

impl From<FirstOccurrences> for Vec<i64> {
    fn from(value: FirstOccurrences) -> Self {
        value.to_sentinel_indices()
    }
}

impl From<Vec<i64>> for FirstOccurrences {
    fn from(value: Vec<i64>) -> Self {
        FirstOccurrences(
            value
                .into_iter()
                .map(|i| usize::try_from(i).ok())
                .collect(),
        )
    }
}

/// Everything the chart layer needs for one night
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightChart {
    pub report: NormalizationReport,
    pub runs: Vec<Run>,
    pub proportions: StageProportions,
    pub axes: AxisDomains,
    pub first_occurrences: FirstOccurrences,
}

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Complete chart payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPayload {
    pub format_version: String,
    pub producer: ChartProducer,
    pub computed_at_utc: String,
    pub chart: NightChart,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_flag_names_match_serde() {
        for flag in [
            QualityFlag::SkippedRows,
            QualityFlag::OutOfOrder,
            QualityFlag::DuplicateTimestamp,
        ] {
            let wire = serde_json::to_value(&flag).unwrap();
            assert_eq!(wire, flag.as_str());
            assert_eq!(flag.to_string(), flag.as_str());
        }
        assert_eq!(QualityFlag::OutOfOrder.as_str(), "out_of_order");
    }

    #[test]
    fn test_first_occurrences_sentinel_serialization() {
        let occurrences = FirstOccurrences(vec![Some(0), None, Some(3)]);

        let json = serde_json::to_string(&occurrences).unwrap();
        assert_eq!(json, "[0,-1,3]");

        let back: FirstOccurrences = serde_json::from_str(&json).unwrap();
        assert_eq!(back, occurrences);
        assert_eq!(back.get(1), None);
        assert_eq!(back.get(2), Some(3));
    }

    #[test]
    fn test_run_serializes_camel_case_millis() {
        let run = Run {
            stage_label: "N2".to_string(),
            display_order_index: 3,
            portion_percent: 50.0,
            start_time: DateTime::from_timestamp_millis(0).unwrap(),
            end_time: DateTime::from_timestamp_millis(30_000).unwrap(),
        };

        let value = serde_json::to_value(&run).unwrap();
        assert_eq!(value["stageLabel"], "N2");
        assert_eq!(value["displayOrderIndex"], 3);
        assert_eq!(value["startTime"], 0);
        assert_eq!(value["endTime"], 30_000);
    }

    #[test]
    fn test_proportions_lookup() {
        let proportions = StageProportions {
            labels: vec!["Wake".to_string(), "REM".to_string()],
            fractions: vec![0.25, 0.75],
        };

        assert_eq!(proportions.for_label("REM"), Some(0.75));
        assert_eq!(proportions.for_label("N3"), None);
        assert!((proportions.sum() - 1.0).abs() < 1e-12);
    }
}

//! Pipeline orchestration
//!
//! This module provides the public API for hypnoflux.
//! It runs a night of raw rows through every stage and returns the chart data.

use crate::axes::AxisDomains;
use crate::config::ShaperConfig;
use crate::encoder::ChartEncoder;
use crate::error::ShapeError;
use crate::locator::first_occurrences;
use crate::normalizer::Normalizer;
use crate::proportions::StageProportionSummarizer;
use crate::schema::{InputFormat, RawRow, RawRowReader};
use crate::segmenter::RunSegmenter;
use crate::types::NightChart;
use tracing::debug;

/// Convert a hypnogram CSV export into a chart JSON payload using defaults.
///
/// # Arguments
/// * `csv_text` - CSV with `timestamp` (epoch seconds) and `sleep_stage` columns
///
/// # Example
/// ```ignore
/// let chart_json = csv_to_chart_json("timestamp,sleep_stage\n0,0\n30,2\n".to_string())?;
/// ```
pub fn csv_to_chart_json(csv_text: String) -> Result<String, ShapeError> {
    ShapePipeline::default().shape_to_json(&csv_text, InputFormat::Csv)
}

/// Same as [`csv_to_chart_json`] with an explicit JSON configuration
pub fn csv_to_chart_json_with_config(
    csv_text: String,
    config_json: String,
) -> Result<String, ShapeError> {
    let config = ShaperConfig::from_json(&config_json)?;
    ShapePipeline::new(config).shape_to_json(&csv_text, InputFormat::Csv)
}

/// Pipeline bound to one configuration.
///
/// Holds no per-night state; reuse it for as many nights as needed.
pub struct ShapePipeline {
    config: ShaperConfig,
    encoder: ChartEncoder,
}

impl Default for ShapePipeline {
    fn default() -> Self {
        Self::new(ShaperConfig::default())
    }
}

impl ShapePipeline {
    /// Create a pipeline with the given configuration
    pub fn new(config: ShaperConfig) -> Self {
        Self {
            config,
            encoder: ChartEncoder::new(),
        }
    }

    pub fn config(&self) -> &ShaperConfig {
        &self.config
    }

    /// Shape already-parsed rows.
    ///
    /// Pipeline stages:
    /// 1. Normalizer - Coerce rows into samples
    /// 2. RunSegmenter - Build stage runs
    /// 3. StageProportionSummarizer - Whole-night stage mix
    /// 4. AxisDomains - Color, time and category domains
    /// 5. first_occurrences - First run index per stage
    pub fn shape_rows(&self, rows: &[RawRow]) -> Result<NightChart, ShapeError> {
        let taxonomy = &self.config.taxonomy;

        let series = Normalizer::normalize(rows, taxonomy, self.config.malformed_rows)?;
        if series.is_empty() {
            return Err(ShapeError::EmptySeries(format!(
                "no usable samples in {} rows",
                rows.len()
            )));
        }

        let runs = RunSegmenter::segment(&series, taxonomy, self.config.portion_base)?;
        let proportions = StageProportionSummarizer::summarize(&series, taxonomy)?;
        let axes = AxisDomains::configure(taxonomy, &series, &self.config.palette)?;
        let first_occurrences = first_occurrences(&runs, taxonomy.stage_count());

        debug!(
            samples = series.len(),
            runs = runs.len(),
            "shaped night"
        );

        Ok(NightChart {
            report: series.report,
            runs,
            proportions,
            axes,
            first_occurrences,
        })
    }

    /// Parse and shape input text
    pub fn shape(&self, input: &str, format: InputFormat) -> Result<NightChart, ShapeError> {
        let rows = RawRowReader::parse(input, format)?;
        self.shape_rows(&rows)
    }

    pub fn shape_csv(&self, csv_text: &str) -> Result<NightChart, ShapeError> {
        self.shape(csv_text, InputFormat::Csv)
    }

    pub fn shape_json(&self, json: &str) -> Result<NightChart, ShapeError> {
        self.shape(json, InputFormat::Json)
    }

    pub fn shape_ndjson(&self, ndjson: &str) -> Result<NightChart, ShapeError> {
        self.shape(ndjson, InputFormat::Ndjson)
    }

    /// Parse, shape and encode to a chart JSON payload
    pub fn shape_to_json(&self, input: &str, format: InputFormat) -> Result<String, ShapeError> {
        let chart = self.shape(input, format)?;
        self.encoder.encode_to_json(chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::MalformedRowPolicy;
    use crate::segmenter::PortionBase;
    use crate::types::QualityFlag;
    use pretty_assertions::assert_eq;

    fn sample_csv() -> &'static str {
        "timestamp,sleep_stage\n\
         1600000000,0\n\
         1600000030,0\n\
         1600000060,1\n\
         1600000090,2\n\
         1600000120,2\n\
         1600000150,3\n\
         1600000180,2\n\
         1600000210,4\n\
         1600000240,4\n\
         1600000270,0\n"
    }

    #[test]
    fn test_shape_csv() {
        let chart = ShapePipeline::default().shape_csv(sample_csv()).unwrap();

        let labels: Vec<&str> = chart.runs.iter().map(|r| r.stage_label.as_str()).collect();
        assert_eq!(labels, vec!["Wake", "N1", "N2", "N3", "N2", "REM", "Wake"]);

        // 10 samples over 9 intervals
        let total: f64 = chart.runs.iter().map(|r| r.portion_percent).sum();
        assert!((total - 1000.0 / 9.0).abs() < 1e-9);

        assert!((chart.proportions.sum() - 1.0).abs() < 1e-9);
        assert_eq!(chart.proportions.for_label("N2"), Some(0.3));

        assert_eq!(
            chart.axes.time.start.map(|t| t.timestamp()),
            Some(1_600_000_000)
        );
        assert_eq!(
            chart.axes.time.end.map(|t| t.timestamp()),
            Some(1_600_000_270)
        );

        // display order: Wake, REM, N1, N2, N3
        assert_eq!(
            chart.first_occurrences.to_sentinel_indices(),
            vec![0, 5, 1, 2, 3]
        );
    }

    #[test]
    fn test_worked_example_through_json_rows() {
        let json = r#"[
            {"timestamp": 0, "sleep_stage": 0},
            {"timestamp": 1, "sleep_stage": 0},
            {"timestamp": 2, "sleep_stage": 1},
            {"timestamp": 3, "sleep_stage": 1},
            {"timestamp": 4, "sleep_stage": 1}
        ]"#;
        let chart = ShapePipeline::default().shape_json(json).unwrap();

        assert_eq!(chart.runs.len(), 2);
        assert_eq!(chart.runs[0].end_time.timestamp_millis(), 1000);
        assert_eq!(chart.runs[1].start_time.timestamp_millis(), 1000);
        assert_eq!(chart.runs[1].end_time.timestamp_millis(), 4000);
        assert_eq!(
            chart.axes.time.end.map(|t| t.timestamp_millis()),
            Some(4000)
        );
    }

    #[test]
    fn test_skip_policy_through_pipeline() {
        let config = ShaperConfig::default()
            .with_malformed_rows(MalformedRowPolicy::Skip)
            .with_portion_base(PortionBase::Samples);
        let csv = "timestamp,sleep_stage\n0,2\n30,?\n60,2\n90,7\n120,3\n";
        let chart = ShapePipeline::new(config).shape_csv(csv).unwrap();

        assert_eq!(chart.report.rows_kept, 3);
        assert_eq!(chart.report.flags, vec![QualityFlag::SkippedRows]);
        let total: f64 = chart.runs.iter().map(|r| r.portion_percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_row_rejected_by_default() {
        let result = ShapePipeline::default().shape_csv("timestamp,sleep_stage\n0,2\n30,?\n");
        assert!(matches!(result, Err(ShapeError::MalformedRow { row: 1, .. })));
    }

    #[test]
    fn test_empty_input() {
        let result = ShapePipeline::default().shape_csv("timestamp,sleep_stage\n");
        assert!(matches!(result, Err(ShapeError::EmptySeries(_))));

        let config = ShaperConfig::default().with_malformed_rows(MalformedRowPolicy::Skip);
        let result = ShapePipeline::new(config).shape_csv("timestamp,sleep_stage\nx,y\n");
        assert!(matches!(result, Err(ShapeError::EmptySeries(_))));
    }

    #[test]
    fn test_csv_to_chart_json() {
        let json = csv_to_chart_json(sample_csv().to_string()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["producer"]["name"], "hypnoflux");
        assert_eq!(payload["chart"]["runs"][0]["stageLabel"], "Wake");
        assert_eq!(payload["chart"]["first_occurrences"][1], 5);
    }

    #[test]
    fn test_csv_to_chart_json_with_config() {
        let config = r#"{"portion_base": "samples"}"#.to_string();
        let json =
            csv_to_chart_json_with_config("timestamp,sleep_stage\n0,1\n30,1\n".to_string(), config)
                .unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["chart"]["runs"][0]["portionPercent"], 100.0);
        assert_eq!(payload["chart"]["first_occurrences"][0], -1);
    }

    #[test]
    fn test_custom_taxonomy_from_config() {
        let config = ShaperConfig::from_json(
            r#"{
                "taxonomy": {
                    "labels": ["Wake", "Light", "Deep"],
                    "display_order": ["Deep", "Light", "Wake"]
                }
            }"#,
        )
        .unwrap();
        let csv = "timestamp,sleep_stage\n0,0\n30,0\n60,2\n90,2\n120,0\n";
        let chart = ShapePipeline::new(config).shape_csv(csv).unwrap();

        let labels: Vec<&str> = chart.runs.iter().map(|r| r.stage_label.as_str()).collect();
        assert_eq!(labels, vec!["Wake", "Deep", "Wake"]);
        assert_eq!(chart.runs[0].display_order_index, 2);
        assert_eq!(chart.runs[1].display_order_index, 0);

        assert_eq!(chart.proportions.labels, vec!["Deep", "Light", "Wake"]);
        assert_eq!(chart.proportions.fractions, vec![0.4, 0.0, 0.6]);

        assert_eq!(chart.first_occurrences.len(), 3);
        assert_eq!(chart.first_occurrences.to_sentinel_indices(), vec![1, -1, 0]);

        assert_eq!(chart.axes.color.domain, vec!["Wake", "Light", "Deep"]);
        assert_eq!(chart.axes.color.range, vec!["#E3624B", "#B0C9D9", "#4da6fe"]);
        assert_eq!(chart.axes.category.domain, vec!["Deep", "Light", "Wake"]);
    }

    #[test]
    fn test_invalid_csv() {
        let result = csv_to_chart_json("when,what\n1,2\n".to_string());
        assert!(result.is_err());
    }
}

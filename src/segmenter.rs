//! Run segmentation
//!
//! Collapses a normalized series into runs of consecutive samples sharing one
//! stage. A run closes on the sample right before a stage change, and the last
//! sample always closes whatever run is open. The next run starts at the
//! closing sample's timestamp, so adjacent runs share a boundary instant.

use crate::error::ShapeError;
use crate::taxonomy::StageTaxonomy;
use crate::types::{NormalizedSeries, Run};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Denominator used for `Run::portion_percent`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortionBase {
    /// `samples - 1`: the number of epochs between first and last sample.
    /// Every sample is counted in some run, so portions sum to
    /// `100 * n / (n - 1)` rather than 100.
    #[default]
    Intervals,
    /// `samples`: portions sum to exactly 100
    Samples,
}

impl PortionBase {
    fn denominator(&self, sample_count: usize) -> f64 {
        match self {
            PortionBase::Intervals => sample_count.saturating_sub(1).max(1) as f64,
            PortionBase::Samples => sample_count as f64,
        }
    }
}

/// Segmenter for building stage runs
pub struct RunSegmenter;

impl RunSegmenter {
    /// Segment a series into chronological runs
    pub fn segment(
        series: &NormalizedSeries,
        taxonomy: &StageTaxonomy,
        portion_base: PortionBase,
    ) -> Result<Vec<Run>, ShapeError> {
        let samples = &series.samples;
        let first = samples.first().ok_or_else(|| {
            ShapeError::EmptySeries("cannot segment a series with no samples".to_string())
        })?;

        let denominator = portion_base.denominator(samples.len());
        let mut runs = Vec::new();
        let mut run_start = first.timestamp;
        let mut run_stage = first.stage_id;
        let mut run_first_row = 0usize;
        let mut run_count = 0usize;

        for (i, sample) in samples.iter().enumerate() {
            run_count += 1;

            let is_last = i + 1 == samples.len();
            let next_differs = samples
                .get(i + 1)
                .is_some_and(|next| next.stage_id != run_stage);

            if next_differs || is_last {
                let label = taxonomy.label(run_stage).ok_or(ShapeError::UnknownStage {
                    row: run_first_row,
                    stage_id: run_stage,
                })?;
                let display_order_index =
                    taxonomy
                        .display_index(run_stage)
                        .ok_or_else(|| {
                            ShapeError::InvalidTaxonomy(format!(
                                "label {label:?} missing from display order"
                            ))
                        })?;

                runs.push(Run {
                    stage_label: label.to_string(),
                    display_order_index,
                    portion_percent: run_count as f64 / denominator * 100.0,
                    start_time: run_start,
                    end_time: sample.timestamp,
                });

                run_start = sample.timestamp;
                run_stage = samples.get(i + 1).map_or(sample.stage_id, |s| s.stage_id);
                run_first_row = i + 1;
                run_count = 0;
            }
        }

        debug!(
            samples = samples.len(),
            runs = runs.len(),
            "segmented series into stage runs"
        );

        Ok(runs)
    }
}

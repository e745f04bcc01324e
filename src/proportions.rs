//! Stage proportion summary
//!
//! Counts raw samples per stage, independent of run boundaries.

use crate::error::ShapeError;
use crate::taxonomy::StageTaxonomy;
use crate::types::{NormalizedSeries, StageProportions};

/// Summarizer for the whole-night stage mix
pub struct StageProportionSummarizer;

impl StageProportionSummarizer {
    /// Fraction of samples per stage, indexed by display-order position
    pub fn summarize(
        series: &NormalizedSeries,
        taxonomy: &StageTaxonomy,
    ) -> Result<StageProportions, ShapeError> {
        if series.is_empty() {
            return Err(ShapeError::EmptySeries(
                "cannot compute stage proportions without samples".to_string(),
            ));
        }

        let mut counts = vec![0usize; taxonomy.stage_count()];
        for (i, sample) in series.samples.iter().enumerate() {
            let slot = taxonomy
                .display_index(sample.stage_id)
                .ok_or(ShapeError::UnknownStage {
                    row: i,
                    stage_id: sample.stage_id,
                })?;
            counts[slot] += 1;
        }

        let total = series.len() as f64;
        Ok(StageProportions {
            labels: taxonomy.display_order().to_vec(),
            fractions: counts.into_iter().map(|c| c as f64 / total).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NormalizationReport, Sample};
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    fn series(stages: &[usize]) -> NormalizedSeries {
        NormalizedSeries {
            samples: stages
                .iter()
                .enumerate()
                .map(|(i, &stage_id)| Sample {
                    timestamp: DateTime::from_timestamp(i as i64 * 30, 0).unwrap(),
                    stage_id,
                })
                .collect(),
            report: NormalizationReport::default(),
        }
    }

    #[test]
    fn test_fractions_in_display_order() {
        let taxonomy = StageTaxonomy::default();
        // Wake x2, N2 x1, REM x1
        let proportions =
            StageProportionSummarizer::summarize(&series(&[0, 0, 2, 4]), &taxonomy).unwrap();

        assert_eq!(
            proportions.labels,
            vec!["Wake", "REM", "N1", "N2", "N3"]
                .into_iter()
                .map(String::from)
                .collect::<Vec<_>>()
        );
        assert_eq!(proportions.fractions, vec![0.5, 0.25, 0.0, 0.25, 0.0]);
    }

    #[test]
    fn test_sums_to_one_without_negatives() {
        let taxonomy = StageTaxonomy::default();
        let stages: Vec<usize> = (0..997).map(|i| (i * 7 + i / 13) % 5).collect();
        let proportions =
            StageProportionSummarizer::summarize(&series(&stages), &taxonomy).unwrap();

        assert!((proportions.sum() - 1.0).abs() < 1e-9);
        assert!(proportions.fractions.iter().all(|&f| f >= 0.0));
    }

    #[test]
    fn test_counts_samples_not_runs() {
        let taxonomy = StageTaxonomy::default();
        // one long N3 run, three short Wake runs
        let proportions = StageProportionSummarizer::summarize(
            &series(&[3, 3, 3, 3, 3, 0, 3, 0, 3, 0]),
            &taxonomy,
        )
        .unwrap();

        assert_eq!(proportions.for_label("N3"), Some(0.7));
        assert_eq!(proportions.for_label("Wake"), Some(0.3));
    }

    #[test]
    fn test_two_stage_taxonomy() {
        let taxonomy = StageTaxonomy::new(
            vec!["Wake".to_string(), "Sleep".to_string()],
            vec!["Sleep".to_string(), "Wake".to_string()],
        )
        .unwrap();
        let proportions =
            StageProportionSummarizer::summarize(&series(&[1, 1, 0]), &taxonomy).unwrap();

        assert_eq!(proportions.labels, vec!["Sleep", "Wake"]);
        assert_eq!(proportions.fractions.len(), 2);
        assert!((proportions.fractions[0] - 2.0 / 3.0).abs() < 1e-9);
        assert!((proportions.fractions[1] - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_three_stage_taxonomy_absent_stage_is_zero() {
        let taxonomy = StageTaxonomy::new(
            vec!["Wake".to_string(), "Light".to_string(), "Deep".to_string()],
            vec!["Deep".to_string(), "Light".to_string(), "Wake".to_string()],
        )
        .unwrap();
        let proportions =
            StageProportionSummarizer::summarize(&series(&[0, 2, 2, 0]), &taxonomy).unwrap();

        assert_eq!(proportions.labels, vec!["Deep", "Light", "Wake"]);
        assert_eq!(proportions.fractions, vec![0.5, 0.0, 0.5]);
    }

    #[test]
    fn test_empty_series_rejected() {
        let taxonomy = StageTaxonomy::default();
        let result = StageProportionSummarizer::summarize(&series(&[]), &taxonomy);
        assert!(matches!(result, Err(ShapeError::EmptySeries(_))));
    }
}

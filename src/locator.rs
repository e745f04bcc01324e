//! First-occurrence lookup
//!
//! For each display-order slot, finds the first run of that stage so the chart
//! can place one tick or legend entry where the stage first shows up.

use crate::types::{FirstOccurrences, Run};

/// Index within `runs` of the first run per display-order slot
pub fn first_occurrences(runs: &[Run], stage_count: usize) -> FirstOccurrences {
    FirstOccurrences(
        (0..stage_count)
            .map(|slot| runs.iter().position(|run| run.display_order_index == slot))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::STAGE_COUNT;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    fn runs(slots: &[usize]) -> Vec<Run> {
        slots
            .iter()
            .enumerate()
            .map(|(i, &slot)| Run {
                stage_label: format!("stage-{slot}"),
                display_order_index: slot,
                portion_percent: 10.0,
                start_time: DateTime::from_timestamp(i as i64 * 60, 0).unwrap(),
                end_time: DateTime::from_timestamp(i as i64 * 60 + 60, 0).unwrap(),
            })
            .collect()
    }

    #[test]
    fn test_missing_stage_is_not_found() {
        let found = first_occurrences(&runs(&[0, 1, 3, 0, 4, 1]), STAGE_COUNT);

        assert_eq!(found.get(2), None);
        assert_eq!(found.to_sentinel_indices(), vec![0, 1, -1, 2, 4]);
    }

    #[test]
    fn test_stage_first_seen_as_fourth_run() {
        let found = first_occurrences(&runs(&[0, 1, 2, 3, 3, 2]), STAGE_COUNT);

        assert_eq!(found.get(3), Some(3));
        assert_eq!(found.get(2), Some(2));
        assert_eq!(found.get(4), None);
    }

    #[test]
    fn test_slot_count_follows_stage_count() {
        let found = first_occurrences(&runs(&[2, 0, 2]), 3);

        assert_eq!(found.len(), 3);
        assert_eq!(found.to_sentinel_indices(), vec![1, -1, 0]);

        let two = first_occurrences(&runs(&[0, 0, 1]), 2);
        assert_eq!(two.to_sentinel_indices(), vec![0, 2]);
    }

    #[test]
    fn test_no_runs() {
        let found = first_occurrences(&[], STAGE_COUNT);

        assert_eq!(found.len(), STAGE_COUNT);
        assert!(found.0.iter().all(Option::is_none));
    }
}

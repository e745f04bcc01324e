//! Sleep stage taxonomy
//!
//! A taxonomy pairs the label list indexed by stage id with the order in which
//! the chart lays stages out. The two lists hold the same labels; only their
//! order differs.

use crate::error::ShapeError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of stages in the default hypnogram taxonomy
pub const STAGE_COUNT: usize = 5;

/// Default labels, indexed by the stage id found in the `sleep_stage` column
pub const DEFAULT_LABELS: [&str; STAGE_COUNT] = ["Wake", "N1", "N2", "N3", "REM"];

/// Default top-to-bottom order of stages on the categorical axis
pub const DEFAULT_DISPLAY_ORDER: [&str; STAGE_COUNT] = ["Wake", "REM", "N1", "N2", "N3"];

/// Stage labels plus their chart display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaxonomyDef", into = "TaxonomyDef")]
pub struct StageTaxonomy {
    labels: Vec<String>,
    display_order: Vec<String>,
}

/// Unvalidated wire form; deserialization goes through [`StageTaxonomy::new`]
#[derive(Serialize, Deserialize)]
struct TaxonomyDef {
    labels: Vec<String>,
    display_order: Vec<String>,
}

impl TryFrom<TaxonomyDef> for StageTaxonomy {
    type Error = ShapeError;

    fn try_from(def: TaxonomyDef) -> Result<Self, Self::Error> {
        StageTaxonomy::new(def.labels, def.display_order)
    }
}

impl From<StageTaxonomy> for TaxonomyDef {
    fn from(taxonomy: StageTaxonomy) -> Self {
        TaxonomyDef {
            labels: taxonomy.labels,
            display_order: taxonomy.display_order,
        }
    }
}

impl Default for StageTaxonomy {
    fn default() -> Self {
        Self {
            labels: DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
            display_order: DEFAULT_DISPLAY_ORDER.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl StageTaxonomy {
    /// Build a taxonomy, checking that `display_order` is a permutation of `labels`
    pub fn new(labels: Vec<String>, display_order: Vec<String>) -> Result<Self, ShapeError> {
        if labels.is_empty() {
            return Err(ShapeError::InvalidTaxonomy(
                "taxonomy needs at least one stage label".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(ShapeError::InvalidTaxonomy(format!(
                    "duplicate stage label {label:?}"
                )));
            }
        }

        if display_order.len() != labels.len() {
            return Err(ShapeError::InvalidTaxonomy(format!(
                "display order has {} labels, taxonomy has {}",
                display_order.len(),
                labels.len()
            )));
        }

        let mut ordered = HashSet::new();
        for label in &display_order {
            if !seen.contains(label.as_str()) {
                return Err(ShapeError::InvalidTaxonomy(format!(
                    "display order names unknown label {label:?}"
                )));
            }
            if !ordered.insert(label.as_str()) {
                return Err(ShapeError::InvalidTaxonomy(format!(
                    "display order repeats label {label:?}"
                )));
            }
        }

        Ok(Self {
            labels,
            display_order,
        })
    }

    /// Number of stages
    pub fn stage_count(&self) -> usize {
        self.labels.len()
    }

    /// Labels indexed by stage id
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Labels in chart display order
    pub fn display_order(&self) -> &[String] {
        &self.display_order
    }

    /// Label for a stage id, if the id is in range
    pub fn label(&self, stage_id: usize) -> Option<&str> {
        self.labels.get(stage_id).map(String::as_str)
    }

    /// Position of a stage id's label in the display order
    pub fn display_index(&self, stage_id: usize) -> Option<usize> {
        let label = self.label(stage_id)?;
        self.display_order.iter().position(|l| l == label)
    }
}

//! Pipeline configuration

use crate::axes::default_palette;
use crate::error::ShapeError;
use crate::normalizer::MalformedRowPolicy;
use crate::segmenter::PortionBase;
use crate::taxonomy::StageTaxonomy;
use serde::{Deserialize, Serialize};

/// Settings shared by every stage of the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaperConfig {
    pub taxonomy: StageTaxonomy,
    /// Stage colors, matched to `taxonomy.labels()` by position
    pub palette: Vec<String>,
    pub portion_base: PortionBase,
    pub malformed_rows: MalformedRowPolicy,
}

impl Default for ShaperConfig {
    fn default() -> Self {
        Self {
            taxonomy: StageTaxonomy::default(),
            palette: default_palette(),
            portion_base: PortionBase::default(),
            malformed_rows: MalformedRowPolicy::default(),
        }
    }
}

impl ShaperConfig {
    /// Load configuration from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ShapeError> {
        let config: ShaperConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON
    pub fn to_json(&self) -> Result<String, ShapeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check settings that depend on each other
    pub fn validate(&self) -> Result<(), ShapeError> {
        if self.palette.len() < self.taxonomy.stage_count() {
            return Err(ShapeError::PaletteTooShort {
                colors: self.palette.len(),
                labels: self.taxonomy.stage_count(),
            });
        }
        Ok(())
    }

    pub fn with_portion_base(mut self, portion_base: PortionBase) -> Self {
        self.portion_base = portion_base;
        self
    }

    pub fn with_malformed_rows(mut self, policy: MalformedRowPolicy) -> Self {
        self.malformed_rows = policy;
        self
    }
}

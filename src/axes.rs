//! Axis domain configuration
//!
//! Scales are owned by the rendering layer. This module only binds domains
//! (and the stage color range) onto them through two small traits, and ships
//! plain in-memory scales used for the JSON chart payload.

use crate::error::ShapeError;
use crate::taxonomy::StageTaxonomy;
use crate::types::NormalizedSeries;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stage colors, position-for-position with the taxonomy labels
pub const DEFAULT_PALETTE: [&str; 5] = ["#E3624B", "#B0C9D9", "#4da6fe", "#48587f", "#FFD443"];

/// A categorical scale: string domain mapped onto a string range
pub trait OrdinalScale {
    fn set_domain(&mut self, domain: Vec<String>);
    fn set_range(&mut self, range: Vec<String>);
}

/// A continuous time scale
pub trait TimeScale {
    fn set_domain(&mut self, start: DateTime<Utc>, end: DateTime<Utc>);
}

/// Bind stage labels to the palette, in the order given
pub fn assign_color_domain<S: OrdinalScale + ?Sized>(
    scale: &mut S,
    labels: &[String],
    palette: &[String],
) -> Result<(), ShapeError> {
    if palette.len() < labels.len() {
        return Err(ShapeError::PaletteTooShort {
            colors: palette.len(),
            labels: labels.len(),
        });
    }
    scale.set_domain(labels.to_vec());
    scale.set_range(palette[..labels.len()].to_vec());
    Ok(())
}

/// Bind the first and last sample timestamps; the series is not sorted
pub fn assign_time_domain<S: TimeScale + ?Sized>(
    scale: &mut S,
    series: &NormalizedSeries,
) -> Result<(), ShapeError> {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) => {
            scale.set_domain(first.timestamp, last.timestamp);
            Ok(())
        }
        _ => Err(ShapeError::EmptySeries(
            "time domain needs at least one sample".to_string(),
        )),
    }
}

/// Bind the display-order labels as the categorical axis domain
pub fn assign_category_domain<S: OrdinalScale + ?Sized>(scale: &mut S, display_order: &[String]) {
    scale.set_domain(display_order.to_vec());
}

/// Category scale with an optional color range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScale {
    pub domain: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub range: Vec<String>,
}

impl CategoryScale {
    /// Range value bound to a domain entry
    pub fn lookup(&self, key: &str) -> Option<&str> {
        let index = self.domain.iter().position(|d| d == key)?;
        self.range.get(index).map(String::as_str)
    }
}

impl OrdinalScale for CategoryScale {
    fn set_domain(&mut self, domain: Vec<String>) {
        self.domain = domain;
    }

    fn set_range(&mut self, range: Vec<String>) {
        self.range = range;
    }
}

/// Time scale holding the bound extent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeExtent {
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub start: Option<DateTime<Utc>>,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub end: Option<DateTime<Utc>>,
}

impl TimeScale for TimeExtent {
    fn set_domain(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.start = Some(start);
        self.end = Some(end);
    }
}

/// The three chart domains for one night
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisDomains {
    pub color: CategoryScale,
    pub time: TimeExtent,
    pub category: CategoryScale,
}

impl AxisDomains {
    /// Configure color, time and category domains for a series
    pub fn configure(
        taxonomy: &StageTaxonomy,
        series: &NormalizedSeries,
        palette: &[String],
    ) -> Result<Self, ShapeError> {
        let mut color = CategoryScale::default();
        let mut time = TimeExtent::default();
        let mut category = CategoryScale::default();

        assign_color_domain(&mut color, taxonomy.labels(), palette)?;
        assign_time_domain(&mut time, series)?;
        assign_category_domain(&mut category, taxonomy.display_order());

        Ok(Self {
            color,
            time,
            category,
        })
    }
}

/// Default palette as owned strings
pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

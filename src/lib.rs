//! hypnoflux - Shapes sleep-stage hypnograms into chart-ready aggregates
//!
//! A night of `timestamp,sleep_stage` rows runs through a deterministic
//! pipeline: normalization → run segmentation → stage proportions → axis
//! domains → first-occurrence lookup.
//!
//! ## Modules
//!
//! - **Pipeline**: normalize, segment and summarize one night of samples
//! - **Layout**: alternating text/image rows for the page around the charts

pub mod axes;
pub mod config;
pub mod encoder;
pub mod error;
pub mod layout;
pub mod locator;
pub mod normalizer;
pub mod pipeline;
pub mod proportions;
pub mod schema;
pub mod segmenter;
pub mod taxonomy;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use axes::AxisDomains;
pub use config::ShaperConfig;
pub use error::ShapeError;
pub use pipeline::{csv_to_chart_json, csv_to_chart_json_with_config, ShapePipeline};
pub use taxonomy::{StageTaxonomy, STAGE_COUNT};
pub use types::{NightChart, Run, Sample, StageProportions};

// Schema exports
pub use schema::{InputFormat, RawRow, RawRowReader};

/// hypnoflux version embedded in all chart payloads
pub const HYPNOFLUX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for chart payloads
pub const PRODUCER_NAME: &str = "hypnoflux";

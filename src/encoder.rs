//! Chart payload encoding
//!
//! This module wraps shaped night data in a versioned payload with producer
//! metadata and serializes it to JSON for the rendering layer.

use crate::error::ShapeError;
use crate::types::{ChartPayload, ChartProducer, NightChart};
use crate::{HYPNOFLUX_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current chart payload format version
pub const CHART_FORMAT_VERSION: &str = "1.0.0";

/// Encoder for producing chart payloads
pub struct ChartEncoder {
    instance_id: String,
}

impl Default for ChartEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap a night in a payload
    pub fn encode(&self, chart: NightChart) -> ChartPayload {
        ChartPayload {
            format_version: CHART_FORMAT_VERSION.to_string(),
            producer: ChartProducer {
                name: PRODUCER_NAME.to_string(),
                version: HYPNOFLUX_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            chart,
        }
    }

    /// Encode to JSON string
    pub fn encode_to_json(&self, chart: NightChart) -> Result<String, ShapeError> {
        let payload = self.encode(chart);
        serde_json::to_string_pretty(&payload).map_err(ShapeError::JsonError)
    }
}

use std::time::Duration;

use serde::{Deserialize, Serialize};
use vellum_document::PlacementPolicy;
use vellum_render::RenderConfig;
use vellum_types::DEFAULT_FALLBACK_NAME;

use crate::error::{LoaderError, LoaderResult};

/// Configuration for the load pipeline.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Pause after each status update so observers see intermediate states.
    /// Zero still yields to the scheduler once.
    pub status_yield_ms: u64,
    /// Label used in messages when a placeholder has no usable name.
    pub fallback_name: String,
    /// Capacity of the load event broadcast channel.
    pub event_capacity: usize,
    pub render: RenderConfig,
    pub placement: PlacementPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            status_yield_ms: 50,
            fallback_name: DEFAULT_FALLBACK_NAME.into(),
            event_capacity: 256,
            render: RenderConfig::default(),
            placement: PlacementPolicy::default(),
        }
    }
}

impl LoaderConfig {
    /// A configuration that never sleeps between phases.
    pub fn immediate() -> Self {
        Self {
            status_yield_ms: 0,
            ..Default::default()
        }
    }

    pub fn status_yield(&self) -> Duration {
        Duration::from_millis(self.status_yield_ms)
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> LoaderResult<Self> {
        toml::from_str(s).map_err(|e| LoaderError::Config(e.to_string()))
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> LoaderResult<String> {
        toml::to_string(self).map_err(|e| LoaderError::Config(e.to_string()))
    }
}

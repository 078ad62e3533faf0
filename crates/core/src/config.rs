//! Configuration shared by shape metrics and packers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Common configuration for metric construction and packing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Place objects geometrically in the packing tree.
    ///
    /// When disabled the packer only compares free volume against the
    /// object's volume.
    pub packing_enabled: bool,

    /// Build convex hulls for metrics made from sub-shapes.
    pub precise_metrics: bool,

    /// Minimum share of the running bounding volume a sub-shape must have
    /// for all of its vertices to be sampled. Smaller sub-shapes only
    /// contribute their 8 box corners.
    pub full_vertex_ratio: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            packing_enabled: true,
            precise_metrics: false,
            full_vertex_ratio: 0.1,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables geometric packing.
    pub fn with_packing(mut self, enabled: bool) -> Self {
        self.packing_enabled = enabled;
        self
    }

    /// Enables or disables convex hulls for sub-shape metrics.
    pub fn with_precise_metrics(mut self, precise: bool) -> Self {
        self.precise_metrics = precise;
        self
    }

    /// Sets the full-vertex sampling threshold (clamped to `0.0..=1.0`).
    pub fn with_full_vertex_ratio(mut self, ratio: f64) -> Self {
        self.full_vertex_ratio = ratio.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::new();
        assert!(config.packing_enabled);
        assert!(!config.precise_metrics);
        assert_eq!(config.full_vertex_ratio, 0.1);
    }

    #[test]
    fn test_config_builder() {
        let config = Config::new()
            .with_packing(false)
            .with_precise_metrics(true)
            .with_full_vertex_ratio(1.5);
        assert!(!config.packing_enabled);
        assert!(config.precise_metrics);
        assert_eq!(config.full_vertex_ratio, 1.0);
    }
}

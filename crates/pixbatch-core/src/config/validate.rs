//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.worker_count == Some(0) {
            return Err(ConfigError::ValidationError(
                "processing.worker_count must be > 0".into(),
            ));
        }
        if self.processing.supported_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_extensions must not be empty".into(),
            ));
        }
        if self.pipeline.ingress_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.ingress_capacity must be > 0".into(),
            ));
        }
        if self.pipeline.egress_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.egress_capacity must be > 0".into(),
            ));
        }
        if !self.filter.blur_sigma.is_finite() || self.filter.blur_sigma <= 0.0 {
            return Err(ConfigError::ValidationError(
                "filter.blur_sigma must be a positive number".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        Ok(())
    }
}

//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::FilterKind;

/// Input/output and worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Directory the source images are read from
    pub input_dir: PathBuf,

    /// Directory the filtered images are written to (created if absent)
    pub output_dir: PathBuf,

    /// Filter applied to every image
    pub filter: FilterKind,

    /// Size of the worker pool. Unset means one worker per logical core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_count: Option<usize>,

    /// Accepted input extensions (matched case-insensitively)
    pub supported_extensions: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("images"),
            output_dir: PathBuf::from("output"),
            filter: FilterKind::Grayscale,
            worker_count: None,
            supported_extensions: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
        }
    }
}

/// Channel capacities between stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max raw images buffered between the loader and the worker pool
    pub ingress_capacity: usize,

    /// Max filtered images buffered between the worker pool and the saver
    pub egress_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ingress_capacity: 32,
            egress_capacity: 32,
        }
    }
}

/// Filter parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Standard deviation of the Gaussian used by the blur filter
    pub blur_sigma: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { blur_sigma: 2.0 }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_dimension: 20000,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

//! CLI enum types for the run command: filter and report format.

use clap::ValueEnum;
use pixbatch_core::{FilterKind, ReportFormat};

/// Filter choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FilterArg {
    /// Convert to 8-bit grayscale
    Grayscale,
    /// Gaussian blur (strength set by --blur-sigma)
    Blur,
}

impl From<FilterArg> for FilterKind {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Grayscale => FilterKind::Grayscale,
            FilterArg::Blur => FilterKind::Blur,
        }
    }
}

/// Supported report formats.
#[derive(Clone, Copy, Debug, ValueEnum, Default)]
pub enum ReportFormatArg {
    /// Full run report as one JSON document
    #[default]
    Json,
    /// One outcome per input file (newline-delimited)
    Jsonl,
}

impl From<ReportFormatArg> for ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Json => ReportFormat::Json,
            ReportFormatArg::Jsonl => ReportFormat::JsonLines,
        }
    }
}

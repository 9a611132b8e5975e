//! Core data types for the Pixbatch pipeline.
//!
//! [`WorkItem`] is the unit that moves between stages, [`Message`] is what the
//! channels actually carry, and [`RunReport`] is what a finished run returns.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::str::FromStr;

/// A named, immutable image payload at one stage of the pipeline.
///
/// The loader creates one per source file. Workers consume it and produce a
/// new item with the same name; the saver consumes that one and discards it.
/// Ownership moves through the channels, so no two stages ever hold the same
/// item. The name is kept as an `OsString` so a basename that is not valid
/// UTF-8 is written back out byte for byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    name: OsString,
    payload: Vec<u8>,
}

impl WorkItem {
    /// Create a work item from a source name and its encoded bytes.
    pub fn new(name: impl Into<OsString>, payload: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Stable identifier: the source file basename.
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    /// The name rendered for logs and reports, lossy for non-UTF-8 names.
    pub fn display_name(&self) -> Cow<'_, str> {
        self.name.to_string_lossy()
    }

    /// Encoded image bytes (pre-filter on ingress, post-filter on egress).
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// True if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Build the next-stage item: same name, new payload.
    pub fn with_payload(&self, payload: Vec<u8>) -> Self {
        Self {
            name: self.name.clone(),
            payload,
        }
    }

    /// Split into name and payload, consuming the item.
    pub fn into_parts(self) -> (OsString, Vec<u8>) {
        (self.name, self.payload)
    }
}

/// Element type of every pipeline channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// An image to handle
    Item(WorkItem),
    /// No further items will arrive for the consumer that receives this
    Terminate,
}

impl Message {
    /// True for the termination marker.
    pub fn is_terminate(&self) -> bool {
        matches!(self, Message::Terminate)
    }
}

impl From<WorkItem> for Message {
    fn from(item: WorkItem) -> Self {
        Message::Item(item)
    }
}

/// Filter applied to every image of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Convert to 8-bit luma
    #[default]
    Grayscale,
    /// Gaussian blur
    Blur,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Grayscale => write!(f, "grayscale"),
            FilterKind::Blur => write!(f, "blur"),
        }
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grayscale" | "greyscale" | "gray" | "grey" => Ok(FilterKind::Grayscale),
            "blur" => Ok(FilterKind::Blur),
            other => Err(format!(
                "unknown filter '{other}' (expected 'grayscale' or 'blur')"
            )),
        }
    }
}

/// Encoding used for every output file, regardless of the input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOutputFormat {
    #[default]
    Png,
}

impl From<ImageOutputFormat> for image::ImageFormat {
    fn from(format: ImageOutputFormat) -> Self {
        match format {
            ImageOutputFormat::Png => image::ImageFormat::Png,
        }
    }
}

/// Pipeline stage that an item failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Load,
    Transform,
    Save,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Load => write!(f, "load"),
            Stage::Transform => write!(f, "transform"),
            Stage::Save => write!(f, "save"),
        }
    }
}

/// A per-item failure, reported but never fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedItem {
    /// Source file name
    pub name: String,

    /// Stage the item was dropped in
    pub stage: Stage,

    /// Human-readable cause
    pub reason: String,
}

impl FailedItem {
    pub fn new(name: impl Into<String>, stage: Stage, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stage,
            reason: reason.into(),
        }
    }
}

/// Outcome of a complete pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Source files handed to the loader
    pub discovered: usize,

    /// Items the loader placed on the ingress channel
    pub loaded: usize,

    /// Items the worker pool placed on the egress channel
    pub processed: usize,

    /// Names written to the output directory
    pub saved: Vec<String>,

    /// Items dropped with a reported error
    pub failures: Vec<FailedItem>,

    /// One entry per worker of the pool
    pub worker_reports: Vec<WorkerReport>,

    /// Filter applied during the run
    pub filter: FilterKind,

    /// Wall-clock duration in seconds
    pub total_seconds: f64,
}

/// What one worker did before it exited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerReport {
    /// Index of the worker within the pool
    pub worker_id: usize,

    /// Items transformed and handed to the egress channel
    pub processed: usize,

    /// Items dropped by this worker
    pub failed: usize,

    /// Termination markers received (1 for a clean exit)
    pub markers_consumed: usize,
}

impl RunReport {
    /// Size of the worker pool.
    pub fn workers(&self) -> usize {
        self.worker_reports.len()
    }

    /// Number of files written.
    pub fn succeeded(&self) -> usize {
        self.saved.len()
    }

    /// Number of items dropped with an error.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Every discovered file was either saved or reported as failed.
    pub fn is_complete(&self) -> bool {
        self.succeeded() + self.failed() == self.discovered
    }

    /// Saved images per second of wall-clock time.
    pub fn images_per_second(&self) -> f64 {
        if self.total_seconds > 0.0 {
            self.succeeded() as f64 / self.total_seconds
        } else {
            0.0
        }
    }

    /// Failures recorded for a given stage.
    pub fn failures_in(&self, stage: Stage) -> impl Iterator<Item = &FailedItem> {
        self.failures.iter().filter(move |f| f.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_item_keeps_name_across_stages() {
        let raw = WorkItem::new("a.jpg", vec![1, 2, 3]);
        let processed = raw.with_payload(vec![9, 9]);
        assert_eq!(processed.name(), "a.jpg");
        assert_eq!(processed.payload(), &[9, 9]);
        assert_eq!(raw.payload(), &[1, 2, 3]);
    }

    #[test]
    fn test_message_terminate() {
        assert!(Message::Terminate.is_terminate());
        let msg: Message = WorkItem::new("b.png", vec![]).into();
        assert!(!msg.is_terminate());
    }

    #[test]
    fn test_filter_kind_parse_case_insensitive() {
        assert_eq!("Grayscale".parse::<FilterKind>(), Ok(FilterKind::Grayscale));
        assert_eq!("BLUR".parse::<FilterKind>(), Ok(FilterKind::Blur));
        assert!("sepia".parse::<FilterKind>().is_err());
    }

    #[test]
    fn test_filter_kind_serde_lowercase() {
        let json = serde_json::to_string(&FilterKind::Blur).unwrap();
        assert_eq!(json, "\"blur\"");
        let parsed: FilterKind = serde_json::from_str("\"grayscale\"").unwrap();
        assert_eq!(parsed, FilterKind::Grayscale);
    }

    #[test]
    fn test_run_report_completeness() {
        let report = RunReport {
            discovered: 3,
            saved: vec!["a.jpg".to_string(), "b.png".to_string()],
            failures: vec![FailedItem::new("c.jpg", Stage::Transform, "corrupt")],
            ..Default::default()
        };
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.is_complete());
        assert_eq!(report.failures_in(Stage::Transform).count(), 1);
        assert_eq!(report.failures_in(Stage::Load).count(), 0);
    }

    #[test]
    fn test_run_report_rate_with_zero_duration() {
        let report = RunReport::default();
        assert_eq!(report.images_per_second(), 0.0);
    }
}

//! Loader stage: reads source files and feeds the ingress channel.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::types::{FailedItem, Stage, WorkItem};

use super::channel::ChannelSender;
use super::events::{EventSink, PipelineEvent};

/// Outcome of the loader stage.
#[derive(Debug, Default)]
pub struct LoaderReport {
    /// Items placed on the ingress channel
    pub loaded: usize,
    /// Files that could not be read or queued
    pub failures: Vec<FailedItem>,
}

/// Name carried by the work item for a source path: its basename, unaltered.
pub fn item_file_name(path: &Path) -> OsString {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_os_string()
}

/// The basename as shown in logs and reports.
pub fn item_name(path: &Path) -> String {
    item_file_name(path).to_string_lossy().into_owned()
}

/// Read every path in order and queue it on `ingress`.
///
/// A file that cannot be read is reported and skipped. The loader never
/// sends termination markers; it finishes by returning its report, which is
/// the completion signal the controller waits on.
pub async fn run_loader(
    paths: Vec<PathBuf>,
    ingress: ChannelSender,
    events: EventSink,
) -> LoaderReport {
    let mut report = LoaderReport::default();
    let mut remaining = paths.into_iter();

    while let Some(path) = remaining.next() {
        let name = item_name(&path);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(source) => {
                let err = PipelineError::FileRead { path, source };
                report.failures.push(events.failure(&name, Stage::Load, &err));
                continue;
            }
        };

        let size = bytes.len();
        let item = WorkItem::new(item_file_name(&path), bytes);
        if ingress.send_item(item).await.is_err() {
            // No worker is left to take anything; account for the rest.
            tracing::warn!("Ingress channel closed, abandoning remaining files");
            let err = PipelineError::StageAborted {
                stage: "transform".to_string(),
                message: "worker pool is gone".to_string(),
            };
            report.failures.push(events.failure(&name, Stage::Load, &err));
            for path in remaining.by_ref() {
                report
                    .failures
                    .push(events.failure(&item_name(&path), Stage::Load, &err));
            }
            break;
        }

        report.loaded += 1;
        tracing::debug!("Loaded: {} ({} bytes)", name, size);
        events.emit(PipelineEvent::Loaded { name, bytes: size });
    }

    tracing::info!(
        "Image loading complete: {} loaded, {} failed",
        report.loaded,
        report.failures.len()
    );
    report
}

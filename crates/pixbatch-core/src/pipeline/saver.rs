//! Saver stage: drains the egress channel into the output directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::PipelineError;
use crate::types::{FailedItem, Message, Stage, WorkItem};

use super::channel::ChannelReceiver;
use super::codec::ImageCodec;
use super::events::{EventSink, PipelineEvent};

/// Outcome of the saver stage.
#[derive(Debug, Default)]
pub struct SaverReport {
    /// Names written to the output directory, in write order
    pub saved: Vec<String>,
    /// Items that could not be decoded or written
    pub failures: Vec<FailedItem>,
}

/// Write every item received on `egress` to `output_dir/<name>`.
///
/// Returns after the single termination marker arrives. Each payload is
/// decoded before it is written so a damaged result never lands on disk.
pub async fn run_saver(
    mut egress: ChannelReceiver,
    output_dir: PathBuf,
    codec: Arc<dyn ImageCodec>,
    events: EventSink,
) -> SaverReport {
    let mut report = SaverReport::default();

    loop {
        let item = match egress.recv().await {
            Some(Message::Item(item)) => item,
            Some(Message::Terminate) => break,
            None => {
                tracing::warn!("Egress closed without a termination marker");
                break;
            }
        };

        let name = item.display_name().into_owned();
        match save_item(item, &output_dir, &codec).await {
            Ok(path) => {
                tracing::debug!("Saved: {} -> {:?}", name, path);
                events.emit(PipelineEvent::Saved { name: name.clone() });
                report.saved.push(name);
            }
            Err(err) => {
                report.failures.push(events.failure(&name, Stage::Save, &err));
            }
        }
    }

    tracing::info!(
        "All images saved: {} written, {} failed",
        report.saved.len(),
        report.failures.len()
    );
    report
}

async fn save_item(
    item: WorkItem,
    output_dir: &Path,
    codec: &Arc<dyn ImageCodec>,
) -> Result<PathBuf, PipelineError> {
    let label = item.display_name().into_owned();
    let (name, payload) = item.into_parts();
    let path = output_dir.join(name);

    let codec = codec.clone();
    let payload = tokio::task::spawn_blocking(move || codec.decode(&payload).map(|_| payload))
        .await
        .map_err(|e| PipelineError::Decode {
            name: label.clone(),
            message: format!("decode task failed: {e}"),
        })?
        .map_err(|e| e.for_item(&label))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PipelineError::FileWrite {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
    }

    tokio::fs::write(&path, payload)
        .await
        .map_err(|e| PipelineError::FileWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::channel::bounded_channel;
    use crate::pipeline::codec::ImageCrateCodec;
    use crate::pipeline::test_support::png_bytes;

    #[tokio::test]
    async fn test_saver_writes_items_until_marker() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("output");
        let (tx, rx) = bounded_channel(4);
        let bytes = png_bytes(3, 3);

        tx.send_item(WorkItem::new("a.jpg", bytes.clone())).await.unwrap();
        tx.send_item(WorkItem::new("b.png", bytes.clone())).await.unwrap();
        tx.terminate(1).await.unwrap();

        let report = run_saver(
            rx,
            out.clone(),
            Arc::new(ImageCrateCodec::default()),
            EventSink::none(),
        )
        .await;

        assert_eq!(report.saved, vec!["a.jpg", "b.png"]);
        assert!(report.failures.is_empty());
        assert_eq!(std::fs::read(out.join("a.jpg")).unwrap(), bytes);
        assert!(out.join("b.png").exists());
    }

    #[tokio::test]
    async fn test_saver_reports_undecodable_payload() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = bounded_channel(4);

        tx.send_item(WorkItem::new("junk.png", b"not an image".to_vec()))
            .await
            .unwrap();
        tx.send_item(WorkItem::new("ok.png", png_bytes(2, 2))).await.unwrap();
        tx.terminate(1).await.unwrap();

        let report = run_saver(
            rx,
            dir.path().to_path_buf(),
            Arc::new(ImageCrateCodec::default()),
            EventSink::none(),
        )
        .await;

        assert_eq!(report.saved, vec!["ok.png"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, Stage::Save);
        assert!(!dir.path().join("junk.png").exists());
    }

    #[tokio::test]
    async fn test_saver_reports_write_error_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        // A directory occupying the target name makes the write fail.
        std::fs::create_dir(dir.path().join("taken.png")).unwrap();
        let (tx, rx) = bounded_channel(4);

        tx.send_item(WorkItem::new("taken.png", png_bytes(2, 2))).await.unwrap();
        tx.send_item(WorkItem::new("free.png", png_bytes(2, 2))).await.unwrap();
        tx.terminate(1).await.unwrap();

        let report = run_saver(
            rx,
            dir.path().to_path_buf(),
            Arc::new(ImageCrateCodec::default()),
            EventSink::none(),
        )
        .await;

        assert_eq!(report.saved, vec!["free.png"]);
        assert_eq!(report.failures[0].name, "taken.png");
        assert!(report.failures[0].reason.contains("Failed to write"));
    }
}

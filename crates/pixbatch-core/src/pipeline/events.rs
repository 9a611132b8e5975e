//! Progress events emitted while a pipeline runs.
//!
//! Stages report item outcomes and the controller reports state changes
//! through an [`EventSink`]. The CLI uses it to drive a progress bar.

use std::fmt;
use std::sync::Arc;

use crate::error::PipelineError;
use crate::types::{FailedItem, Stage};

use super::controller::PipelineState;

/// Which hand-off queue a marker was sent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Ingress,
    Egress,
}

/// Something observable happened in the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// The controller moved to a new state
    StateChanged(PipelineState),
    /// The loader queued an item on the ingress channel
    Loaded { name: String, bytes: usize },
    /// A worker queued a filtered item on the egress channel
    Processed { name: String, worker_id: usize },
    /// The saver wrote an item to the output directory
    Saved { name: String },
    /// An item was dropped
    Failed(FailedItem),
    /// The controller enqueued termination markers
    MarkersSent { channel: ChannelKind, count: usize },
    /// A worker left its loop
    WorkerExited { worker_id: usize },
}

impl PipelineEvent {
    /// True for events that end an item's journey (saved or dropped).
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineEvent::Saved { .. } | PipelineEvent::Failed(_))
    }
}

type Callback = Arc<dyn Fn(&PipelineEvent) + Send + Sync>;

/// Cloneable handle that forwards events to an optional observer.
#[derive(Clone, Default)]
pub struct EventSink {
    callback: Option<Callback>,
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSink")
            .field("observed", &self.callback.is_some())
            .finish()
    }
}

impl EventSink {
    /// A sink that forwards every event to `f`.
    ///
    /// `f` is called from several tasks concurrently.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&PipelineEvent) + Send + Sync + 'static,
    {
        Self {
            callback: Some(Arc::new(f)),
        }
    }

    /// A sink that drops every event.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: PipelineEvent) {
        if let Some(callback) = &self.callback {
            callback(&event);
        }
    }

    /// Log a per-item error, emit it, and return the record for the report.
    pub fn failure(&self, name: &str, stage: Stage, error: &PipelineError) -> FailedItem {
        tracing::error!("Failed: {} ({} stage) - {}", name, stage, error);
        let failed = FailedItem::new(name, stage, error.to_string());
        self.emit(PipelineEvent::Failed(failed.clone()));
        failed
    }
}

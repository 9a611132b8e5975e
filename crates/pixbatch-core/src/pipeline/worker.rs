//! Worker pool: N symmetric workers applying the filter in parallel.
//!
//! Each worker pulls one message at a time from the shared ingress receiver,
//! runs the CPU-bound transform on tokio's blocking thread pool, and pushes a
//! new work item onto the egress channel. A worker exits after consuming
//! exactly one termination marker.

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::error::PipelineError;
use crate::types::{FailedItem, FilterKind, Message, Stage, WorkItem, WorkerReport};

use super::channel::{ChannelSender, SharedReceiver};
use super::codec::ImageCodec;
use super::events::{EventSink, PipelineEvent};

/// Everything a worker needs besides its channels.
#[derive(Clone)]
pub struct WorkerContext {
    pub codec: Arc<dyn ImageCodec>,
    pub filter: FilterKind,
    pub events: EventSink,
}

/// Report and per-item failures of one worker.
#[derive(Debug, Default)]
pub struct WorkerOutcome {
    pub report: WorkerReport,
    pub failures: Vec<FailedItem>,
}

/// Run one worker until it receives its termination marker.
pub async fn run_worker(
    worker_id: usize,
    ingress: SharedReceiver,
    egress: ChannelSender,
    ctx: WorkerContext,
) -> WorkerOutcome {
    let mut outcome = WorkerOutcome {
        report: WorkerReport {
            worker_id,
            ..Default::default()
        },
        failures: Vec::new(),
    };

    loop {
        let item = match ingress.recv().await {
            Some(Message::Item(item)) => item,
            Some(Message::Terminate) => {
                outcome.report.markers_consumed += 1;
                break;
            }
            None => {
                tracing::warn!("Worker {worker_id}: ingress closed without a termination marker");
                break;
            }
        };

        let name = item.display_name().into_owned();
        let processed = match transform(item, &ctx).await {
            Ok(processed) => processed,
            Err(err) => {
                outcome.report.failed += 1;
                outcome
                    .failures
                    .push(ctx.events.failure(&name, Stage::Transform, &err));
                continue;
            }
        };

        // A closed egress means the saver is gone. Keep draining so the
        // controller can still deliver this worker's marker.
        if egress.send_item(processed).await.is_err() {
            let err = PipelineError::StageAborted {
                stage: "save".to_string(),
                message: "egress channel closed".to_string(),
            };
            outcome.report.failed += 1;
            outcome
                .failures
                .push(ctx.events.failure(&name, Stage::Transform, &err));
            continue;
        }

        outcome.report.processed += 1;
        tracing::debug!("Processed: {} (worker {})", name, worker_id);
        ctx.events.emit(PipelineEvent::Processed { name, worker_id });
    }

    tracing::debug!(
        "Worker {} exiting: {} processed, {} failed",
        worker_id,
        outcome.report.processed,
        outcome.report.failed
    );
    ctx.events.emit(PipelineEvent::WorkerExited { worker_id });
    outcome
}

/// Decode, filter and re-encode one item off the async runtime.
async fn transform(item: WorkItem, ctx: &WorkerContext) -> Result<WorkItem, PipelineError> {
    let label = item.display_name().into_owned();
    let (name, payload) = item.into_parts();
    let codec = ctx.codec.clone();
    let filter = ctx.filter;

    let result = tokio::task::spawn_blocking(move || codec.transform(&payload, filter)).await;

    match result {
        Ok(Ok(bytes)) => Ok(WorkItem::new(name, bytes)),
        Ok(Err(e)) => Err(e.for_item(&label)),
        Err(e) => Err(PipelineError::Filter {
            name: label,
            message: format!("transform task failed: {e}"),
        }),
    }
}

/// A fixed-size set of running workers.
pub struct WorkerPool {
    handles: Vec<JoinHandle<WorkerOutcome>>,
}

impl WorkerPool {
    /// Start `size` workers sharing `ingress` and feeding `egress`.
    ///
    /// The pool holds no receiver clone of its own, so the ingress channel
    /// closes once every worker has exited.
    pub fn spawn(
        size: usize,
        ingress: SharedReceiver,
        egress: ChannelSender,
        ctx: WorkerContext,
    ) -> Result<Self, PipelineError> {
        if size == 0 {
            return Err(PipelineError::FatalStartup {
                message: "worker pool needs at least one worker".to_string(),
            });
        }

        let handles = (0..size)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    ingress.clone(),
                    egress.clone(),
                    ctx.clone(),
                ))
            })
            .collect();

        tracing::debug!("Started {} worker(s) with filter {}", size, ctx.filter);
        Ok(Self { handles })
    }

    /// Number of workers in the pool.
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait until every worker has exited.
    pub async fn join(self) -> Result<Vec<WorkerOutcome>, PipelineError> {
        let mut outcomes = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            let outcome = handle.await.map_err(|e| PipelineError::StageAborted {
                stage: "transform".to_string(),
                message: e.to_string(),
            })?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

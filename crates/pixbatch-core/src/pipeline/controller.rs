//! Pipeline controller - wires the stages together and sequences shutdown.
//!
//! ```text
//! disk → Loader → ingress → Worker ×N → egress → Saver → disk
//! ```
//!
//! Shutdown is driven by termination markers: once the loader finishes, one
//! marker per worker goes onto ingress; once every worker has exited, a
//! single marker goes onto egress; the run completes when the saver exits.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{FilterKind, RunReport};

use super::channel::bounded_channel;
use super::codec::{ImageCodec, ImageCrateCodec};
use super::events::{ChannelKind, EventSink, PipelineEvent};
use super::loader::run_loader;
use super::saver::run_saver;
use super::worker::{WorkerContext, WorkerPool};

/// Lifecycle of a single pipeline run. States are never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    LoadingAndDraining,
    AwaitingWorkers,
    AwaitingSaver,
    Complete,
}

/// Parameters of one run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Where filtered images are written
    pub output_dir: PathBuf,
    /// Filter applied to every image
    pub filter: FilterKind,
    /// Number of parallel workers
    pub workers: usize,
    /// Capacity of the loader → workers channel
    pub ingress_capacity: usize,
    /// Capacity of the workers → saver channel
    pub egress_capacity: usize,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.output_dir(),
            filter: config.processing.filter,
            workers: config.worker_count(),
            ingress_capacity: config.pipeline.ingress_capacity,
            egress_capacity: config.pipeline.egress_capacity,
        }
    }
}

/// A configured, not yet started pipeline.
pub struct Pipeline {
    options: PipelineOptions,
    codec: Arc<dyn ImageCodec>,
    events: EventSink,
    state: PipelineState,
}

impl Pipeline {
    /// Create a pipeline using the `image` crate codec with default parameters.
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            codec: Arc::new(ImageCrateCodec::default()),
            events: EventSink::none(),
            state: PipelineState::Idle,
        }
    }

    /// Create a pipeline from configuration, including codec parameters.
    pub fn from_config(config: &Config) -> Self {
        Self::new(PipelineOptions::from_config(config))
            .with_codec(Arc::new(ImageCrateCodec::from_config(config)))
    }

    /// Replace the image codec.
    pub fn with_codec(mut self, codec: Arc<dyn ImageCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Observe progress events.
    pub fn with_events(mut self, events: EventSink) -> Self {
        self.events = events;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    fn transition(&mut self, next: PipelineState) {
        tracing::debug!("Pipeline state: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.events.emit(PipelineEvent::StateChanged(next));
    }

    /// Run the pipeline over `files` to completion.
    ///
    /// Per-item errors are recorded in the report. An error is returned only
    /// if the pipeline cannot start or one of its stages aborts.
    pub async fn run(mut self, files: Vec<PathBuf>) -> PipelineResult<RunReport> {
        let start = Instant::now();
        let workers = self.options.workers;
        let discovered = files.len();

        if workers == 0 {
            return Err(PipelineError::FatalStartup {
                message: "worker count must be at least 1".to_string(),
            });
        }
        if self.options.ingress_capacity == 0 || self.options.egress_capacity == 0 {
            return Err(PipelineError::FatalStartup {
                message: "channel capacities must be at least 1".to_string(),
            });
        }
        tokio::fs::create_dir_all(&self.options.output_dir)
            .await
            .map_err(|e| PipelineError::FatalStartup {
                message: format!(
                    "cannot create output directory {}: {}",
                    self.options.output_dir.display(),
                    e
                ),
            })?;

        let (ingress_tx, ingress_rx) = bounded_channel(self.options.ingress_capacity);
        let (egress_tx, egress_rx) = bounded_channel(self.options.egress_capacity);

        tracing::info!(
            "Processing {} image(s) with {} worker(s), filter: {}",
            discovered,
            workers,
            self.options.filter
        );

        // Idle → LoadingAndDraining: all three stages run concurrently from here.
        self.transition(PipelineState::LoadingAndDraining);
        let loader = tokio::spawn(run_loader(files, ingress_tx.clone(), self.events.clone()));
        let pool = WorkerPool::spawn(
            workers,
            ingress_rx.into_shared(),
            egress_tx.clone(),
            WorkerContext {
                codec: self.codec.clone(),
                filter: self.options.filter,
                events: self.events.clone(),
            },
        )?;
        let saver = tokio::spawn(run_saver(
            egress_rx,
            self.options.output_dir.clone(),
            self.codec.clone(),
            self.events.clone(),
        ));

        let loader_report = loader.await.map_err(|e| PipelineError::StageAborted {
            stage: "load".to_string(),
            message: e.to_string(),
        })?;

        // LoadingAndDraining → AwaitingWorkers: one marker per worker.
        self.transition(PipelineState::AwaitingWorkers);
        tracing::info!("Image loading complete. Sending stop signals to workers...");
        if ingress_tx.terminate(pool.size()).await.is_err() {
            tracing::warn!("Ingress closed before all stop signals were delivered");
        }
        self.events.emit(PipelineEvent::MarkersSent {
            channel: ChannelKind::Ingress,
            count: pool.size(),
        });
        drop(ingress_tx);

        let worker_outcomes = pool.join().await?;

        // AwaitingWorkers → AwaitingSaver: the saver is the only egress consumer.
        self.transition(PipelineState::AwaitingSaver);
        tracing::info!("All workers complete.");
        if egress_tx.terminate(1).await.is_err() {
            tracing::warn!("Egress closed before the stop signal was delivered");
        }
        self.events.emit(PipelineEvent::MarkersSent {
            channel: ChannelKind::Egress,
            count: 1,
        });
        drop(egress_tx);

        let saver_report = saver.await.map_err(|e| PipelineError::StageAborted {
            stage: "save".to_string(),
            message: e.to_string(),
        })?;

        self.transition(PipelineState::Complete);

        let mut failures = loader_report.failures;
        let mut worker_reports = Vec::with_capacity(worker_outcomes.len());
        for outcome in worker_outcomes {
            failures.extend(outcome.failures);
            worker_reports.push(outcome.report);
        }
        failures.extend(saver_report.failures);

        let report = RunReport {
            discovered,
            loaded: loader_report.loaded,
            processed: worker_reports.iter().map(|w| w.processed).sum(),
            saved: saver_report.saved,
            failures,
            worker_reports,
            filter: self.options.filter,
            total_seconds: start.elapsed().as_secs_f64(),
        };

        tracing::info!(
            "Pipeline complete: {} saved, {} failed in {:.2}s",
            report.succeeded(),
            report.failed(),
            report.total_seconds
        );
        Ok(report)
    }
}

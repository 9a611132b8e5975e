//! Pixbatch Core - Embeddable batch image filter pipeline.
//!
//! Pixbatch reads a directory of images, applies one filter (grayscale or
//! blur) to each, and writes PNG-encoded results to an output directory.
//!
//! # Architecture
//!
//! I/O is decoupled from CPU-bound filtering by bounded channels:
//!
//! ```text
//! Loader → ingress → Worker ×N (parallel) → egress → Saver
//! ```
//!
//! The controller starts all three stages concurrently, then shuts them down
//! in order with termination markers once the input is exhausted.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pixbatch_core::{Config, Pixbatch};
//!
//! #[tokio::main]
//! async fn main() -> pixbatch_core::Result<()> {
//!     let config = Config::load()?;
//!     let report = Pixbatch::new(config)?.run().await?;
//!     println!("{} saved, {} failed", report.succeeded(), report.failed());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;

use std::path::PathBuf;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult, PixbatchError, Result};
pub use output::{ItemOutcome, ReportFormat, ReportWriter};
pub use pipeline::{
    DiscoveredFile, EventSink, FileDiscovery, ImageCodec, ImageCrateCodec, Pipeline,
    PipelineEvent, PipelineOptions, PipelineState,
};
pub use types::{FailedItem, FilterKind, Message, RunReport, Stage, WorkItem, WorkerReport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pixbatch runner - the main entry point for a batch run.
pub struct Pixbatch {
    config: Config,
}

impl Pixbatch {
    /// Create a runner with the given configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        tracing::debug!("Initializing Pixbatch v{}", VERSION);
        Ok(Self { config })
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// List the supported images in the configured input directory.
    pub fn discover(&self) -> Result<Vec<DiscoveredFile>> {
        let discovery = FileDiscovery::new(&self.config.processing);
        Ok(discovery.discover(&self.config.input_dir())?)
    }

    /// Discover and process the configured input directory.
    pub async fn run(&self) -> Result<RunReport> {
        self.run_with_events(EventSink::none()).await
    }

    /// Like [`run`](Self::run), reporting progress to `events`.
    pub async fn run_with_events(&self, events: EventSink) -> Result<RunReport> {
        let files = self.discover()?;
        self.run_files(files.into_iter().map(|f| f.path).collect(), events)
            .await
    }

    /// Process an explicit list of files.
    pub async fn run_files(&self, files: Vec<PathBuf>, events: EventSink) -> Result<RunReport> {
        let report = Pipeline::from_config(&self.config)
            .with_events(events)
            .run(files)
            .await?;
        Ok(report)
    }
}

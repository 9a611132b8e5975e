//! Image processing pipeline components.
//!
//! This module contains the stages of the batch filter pipeline:
//! - **discovery**: Find image files in the input directory
//! - **codec**: Decode, filter and re-encode images
//! - **channel**: Bounded channels for backpressure
//! - **loader**: Read source files onto the ingress channel
//! - **worker**: Parallel filter workers between ingress and egress
//! - **saver**: Write filtered images to the output directory
//! - **controller**: Start-up, termination markers and shutdown order
//! - **events**: Progress notifications for observers

pub mod channel;
pub mod codec;
pub mod controller;
pub mod discovery;
pub mod events;
pub mod loader;
pub mod saver;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenient access
pub use channel::{bounded_channel, ChannelClosed, ChannelReceiver, ChannelSender, SharedReceiver};
pub use codec::{CodecError, ImageCodec, ImageCrateCodec};
pub use controller::{Pipeline, PipelineOptions, PipelineState};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use events::{ChannelKind, EventSink, PipelineEvent};
pub use loader::LoaderReport;
pub use saver::SaverReport;
pub use worker::{WorkerContext, WorkerOutcome, WorkerPool};

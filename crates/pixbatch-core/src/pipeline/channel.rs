//! Bounded channels for backpressure in the processing pipeline.
//!
//! Both hand-off queues carry [`Message`]s. The ingress queue has one producer
//! and many consumers, so its receiver is wrapped in a [`SharedReceiver`]; the
//! egress queue has many producers (cloned senders) and one consumer.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

use crate::types::{Message, WorkItem};

/// The receiving side has been dropped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("channel closed")]
pub struct ChannelClosed;

/// Create a bounded channel pair with the given capacity.
///
/// When the buffer is full, the sender will block, providing backpressure
/// to prevent memory exhaustion during batch processing.
pub fn bounded_channel(capacity: usize) -> (ChannelSender, ChannelReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (ChannelSender { inner: tx }, ChannelReceiver { inner: rx })
}

/// Producer handle. Clone it to add producers.
#[derive(Debug, Clone)]
pub struct ChannelSender {
    inner: mpsc::Sender<Message>,
}

impl ChannelSender {
    /// Send a message, waiting for free space if the channel is full.
    pub async fn send(&self, message: Message) -> Result<(), ChannelClosed> {
        self.inner.send(message).await.map_err(|_| ChannelClosed)
    }

    /// Send a work item.
    pub async fn send_item(&self, item: WorkItem) -> Result<(), ChannelClosed> {
        self.send(Message::Item(item)).await
    }

    /// Enqueue exactly `count` termination markers.
    pub async fn terminate(&self, count: usize) -> Result<(), ChannelClosed> {
        for _ in 0..count {
            self.send(Message::Terminate).await?;
        }
        Ok(())
    }

    /// Messages currently queued.
    pub fn len(&self) -> usize {
        self.inner.max_capacity() - self.inner.capacity()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of queued messages.
    pub fn max_capacity(&self) -> usize {
        self.inner.max_capacity()
    }

    /// True once the receiving side is gone.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Single-consumer receiving handle.
#[derive(Debug)]
pub struct ChannelReceiver {
    inner: mpsc::Receiver<Message>,
}

impl ChannelReceiver {
    /// Wait for the next message.
    ///
    /// Returns `None` only if every sender was dropped and the queue is empty.
    pub async fn recv(&mut self) -> Option<Message> {
        self.inner.recv().await
    }

    /// Turn this receiver into one that many consumers can pull from.
    pub fn into_shared(self) -> SharedReceiver {
        SharedReceiver {
            inner: Arc::new(Mutex::new(self.inner)),
        }
    }
}

/// Receiving handle shared by several consumers.
///
/// Each message is delivered to exactly one consumer, in FIFO order.
#[derive(Debug, Clone)]
pub struct SharedReceiver {
    inner: Arc<Mutex<mpsc::Receiver<Message>>>,
}

impl SharedReceiver {
    /// Wait for the next message. The lock is held for a single receive only.
    pub async fn recv(&self) -> Option<Message> {
        let mut rx = self.inner.lock().await;
        rx.recv().await
    }
}

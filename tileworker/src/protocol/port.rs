//! Message channel between the worker and its host.
//!
//! Inbound messages use a bounded tokio channel; the worker is its only
//! consumer. Outbound messages go through a [`MessageSink`], unbounded by
//! default so that posting a result never blocks the worker loop.
//!
//! ```text
//! HostPort ──InboundMessage──► WorkerPort ──► TileWorker
//!    ▲                                            │
//!    └──────────────OutboundMessage───────────────┘
//! ```

use super::message::{InboundMessage, OutboundMessage};
use tokio::sync::mpsc;
use tracing::debug;

/// Destination for messages emitted by the worker.
///
/// Posting is fire-and-forget: a sink that can no longer deliver drops the
/// message.
pub trait MessageSink: Send + Sync + 'static {
    /// Deliver a message to the host.
    fn post(&self, message: OutboundMessage);
}

impl MessageSink for mpsc::UnboundedSender<OutboundMessage> {
    fn post(&self, message: OutboundMessage) {
        if let Err(err) = self.send(message) {
            debug!(kind = err.0.kind(), "Host receiver closed, dropping message");
        }
    }
}

/// Worker side of the channel.
pub struct WorkerPort<S = mpsc::UnboundedSender<OutboundMessage>> {
    inbound: mpsc::Receiver<InboundMessage>,
    outbound: S,
}

impl<S: MessageSink> WorkerPort<S> {
    /// Build a port from an inbound receiver and any outbound sink.
    pub fn new(inbound: mpsc::Receiver<InboundMessage>, outbound: S) -> Self {
        Self { inbound, outbound }
    }

    /// Split the port into its receiver and sink.
    pub fn into_parts(self) -> (mpsc::Receiver<InboundMessage>, S) {
        (self.inbound, self.outbound)
    }
}

/// Host side of the channel.
pub struct HostPort {
    sender: mpsc::Sender<InboundMessage>,
    receiver: mpsc::UnboundedReceiver<OutboundMessage>,
}

impl HostPort {
    /// Send a message to the worker, waiting for channel capacity.
    pub async fn send(
        &self,
        message: InboundMessage,
    ) -> Result<(), mpsc::error::SendError<InboundMessage>> {
        self.sender.send(message).await
    }

    /// A cloneable sender for additional producers.
    pub fn sender(&self) -> mpsc::Sender<InboundMessage> {
        self.sender.clone()
    }

    /// Wait for the next message from the worker.
    ///
    /// Returns `None` once the worker has stopped.
    pub async fn recv(&mut self) -> Option<OutboundMessage> {
        self.receiver.recv().await
    }

    /// Take a message if one is already queued.
    pub fn try_recv(&mut self) -> Option<OutboundMessage> {
        self.receiver.try_recv().ok()
    }
}

/// Create a connected host/worker pair.
///
/// `capacity` bounds the inbound queue; zero is treated as one.
pub fn worker_channel(capacity: usize) -> (HostPort, WorkerPort) {
    let (in_tx, in_rx) = mpsc::channel(capacity.max(1));
    let (out_tx, out_rx) = mpsc::unbounded_channel();

    let host = HostPort {
        sender: in_tx,
        receiver: out_rx,
    };
    let worker = WorkerPort::new(in_rx, out_tx);

    (host, worker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestKey;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_channel_round_trip() {
        let (mut host, worker) = worker_channel(4);
        let (mut inbound, outbound) = worker.into_parts();

        host.send(InboundMessage::abort()).await.unwrap();
        assert_eq!(inbound.recv().await, Some(InboundMessage::abort()));

        outbound.post(OutboundMessage::DrawResult {
            data: Some(Bytes::from_static(b"tile")),
            url: RequestKey::from("a"),
        });
        let message = host.recv().await.unwrap();
        assert_eq!(message.into_data(), Some(Bytes::from_static(b"tile")));
    }

    #[tokio::test]
    async fn test_post_after_host_dropped_is_silent() {
        let (host, worker) = worker_channel(1);
        let (_inbound, outbound) = worker.into_parts();
        drop(host);

        outbound.post(OutboundMessage::DrawAborted);
    }

    #[tokio::test]
    async fn test_zero_capacity_still_delivers() {
        let (host, worker) = worker_channel(0);
        let (mut inbound, _outbound) = worker.into_parts();

        host.send(InboundMessage::abort()).await.unwrap();
        assert_eq!(inbound.recv().await, Some(InboundMessage::abort()));
    }

    #[test]
    fn test_try_recv_empty() {
        let (mut host, _worker) = worker_channel(1);
        assert!(host.try_recv().is_none());
    }
}

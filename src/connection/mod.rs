//! Transport seam and per-connection outbound path.
//!
//! Every connection gets an [`Outbox`] (bounded queue) and a writer task that
//! drains it into the transport's [`SinkAdapter`]. Rooms only ever touch the
//! outbox, so a slow socket can never hold a room lock.
mod test;

use crate::error::{DeliveryError, TransportError};
use crate::response::Response;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError, Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Write half of a transport.
#[async_trait]
pub trait SinkAdapter: Send + 'static {
    async fn send(&mut self, response: Response) -> Result<(), TransportError>;

    /// Called once after the last envelope has been written.
    async fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Read half of a transport, yielding raw text frames.
#[async_trait]
pub trait StreamAdapter: Send {
    /// `None` once the peer has closed the connection.
    async fn next(&mut self) -> Option<Result<String, TransportError>>;
}

/// Handle used to enqueue envelopes for one connection.
#[derive(Debug, Clone)]
pub struct Outbox {
    client_id: u64,
    sender: Sender<Response>,
}

impl Outbox {
    pub fn channel(client_id: u64, capacity: usize) -> (Outbox, Receiver<Response>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Outbox { client_id, sender }, receiver)
    }

    pub fn client_id(&self) -> u64 {
        self.client_id
    }

    /// Enqueues without waiting; a full or closed outbox drops the envelope.
    pub fn deliver(&self, response: Response) -> Result<(), DeliveryError> {
        self.sender.try_send(response).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Spawns the task that writes queued envelopes to `sink`.
///
/// The task ends when every [`Outbox`] clone is dropped, or on the first
/// failed or timed-out write. Either way the sink is closed.
pub fn spawn_writer<K: SinkAdapter>(
    client_id: u64,
    mut sink: K,
    mut receiver: Receiver<Response>,
    send_timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(response) = receiver.recv().await {
            match tokio::time::timeout(send_timeout, sink.send(response)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(client_id, error = %e, "write failed, stopping writer");
                    break;
                }
                Err(_) => {
                    warn!(client_id, timeout = ?send_timeout, "write timed out, stopping writer");
                    break;
                }
            }
        }

        // stop accepting envelopes before the (possibly slow) close
        receiver.close();
        match tokio::time::timeout(send_timeout, sink.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(client_id, error = %e, "error while closing sink"),
            Err(_) => debug!(client_id, "timed out closing sink"),
        }
    })
}

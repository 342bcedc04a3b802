//! Provides a relay transport over Tokio MPSC channels.
//!
//! Useful for in-process embedding and for exercising the protocol in tests
//! without opening sockets.
mod test;

use crate::config::RelayConfig;
use crate::connection::{SinkAdapter, StreamAdapter};
use crate::error::TransportError;
use crate::relay::Relay;
use crate::response::Response;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver, Sender};

/// An implementation of [`SinkAdapter`] that forwards responses over a channel.
#[derive(Clone)]
pub struct MpscSink {
    sender: Sender<Response>,
}

#[async_trait]
impl SinkAdapter for MpscSink {
    async fn send(&mut self, response: Response) -> Result<(), TransportError> {
        self.sender
            .send(response)
            .await
            .map_err(|_| TransportError::Closed)
    }
}

/// An implementation of [`StreamAdapter`] that reads raw frames from a channel.
pub struct MpscStream {
    receiver: Receiver<String>,
}

#[async_trait]
impl StreamAdapter for MpscStream {
    async fn next(&mut self) -> Option<Result<String, TransportError>> {
        self.receiver.recv().await.map(Ok)
    }
}

/// A relay whose clients are pairs of channels.
///
/// Dropping the frame sender returned by [`MpscRelay::connect`] is the
/// equivalent of the peer closing its socket.
pub struct MpscRelay {
    relay: Arc<Relay>,
}

impl Default for MpscRelay {
    fn default() -> Self {
        MpscRelay::new(RelayConfig::default())
    }
}

impl MpscRelay {
    pub fn new(config: RelayConfig) -> Self {
        MpscRelay {
            relay: Arc::new(Relay::new(config)),
        }
    }

    pub fn relay(&self) -> Arc<Relay> {
        self.relay.clone()
    }

    /// Connects a new client.
    ///
    /// Returns the sender for raw text frames and the receiver for server
    /// envelopes. The connection is served on its own task.
    pub fn connect(&self, buffer_size: usize) -> (Sender<String>, Receiver<Response>) {
        let buffer_size = buffer_size.max(1);
        let (frame_tx, frame_rx) = mpsc::channel(buffer_size);
        let (resp_tx, resp_rx) = mpsc::channel(buffer_size);

        let relay = self.relay.clone();

        tokio::spawn(async move {
            let mut stream = MpscStream { receiver: frame_rx };
            let sink = MpscSink { sender: resp_tx };

            relay.handle_stream(&mut stream, sink).await;
        });

        (frame_tx, resp_rx)
    }
}

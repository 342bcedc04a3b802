
use crate::config::RelayConfig;
use crate::connection::{SinkAdapter, StreamAdapter};
use crate::error::TransportError;
use crate::relay::Relay;
use crate::response::Response;
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, WebSocketStream};
use tracing::{info, warn};
use tungstenite::{Message, Utf8Bytes};

pub struct WSSink {
    sink: SplitSink<WebSocketStream<TcpStream>, Message>,
}

#[async_trait]
impl SinkAdapter for WSSink {
    async fn send(&mut self, response: Response) -> Result<(), TransportError> {
        let message = Message::Text(Utf8Bytes::from(response.to_json()?));
        self.sink.send(message).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.sink.close().await?;
        Ok(())
    }
}

pub struct WSStream {
    stream: SplitStream<WebSocketStream<TcpStream>>,
}

#[async_trait]
impl StreamAdapter for WSStream {
    async fn next(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(_)) => return None,
                // pings are answered by tungstenite itself
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Relay served straight from a `TcpListener`, one websocket per TCP connection.
pub struct WebsocketRelay {
    relay: Arc<Relay>,
    tcp_listener: Option<TcpListener>,
}

impl WebsocketRelay {
    pub fn new(config: RelayConfig) -> Self {
        WebsocketRelay {
            relay: Arc::new(Relay::new(config)),
            tcp_listener: None,
        }
    }

    pub fn relay(&self) -> Arc<Relay> {
        self.relay.clone()
    }

    pub fn bind_listener(&mut self, listener: TcpListener) {
        self.tcp_listener = Some(listener);
    }

    pub async fn bind_addr(&mut self, addr: &str) -> io::Result<()> {
        let tcp_listener = TcpListener::bind(addr).await?;
        self.tcp_listener = Some(tcp_listener);
        Ok(())
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.tcp_listener
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no listener bound"))?
            .local_addr()
    }

    /// Accepts connections forever, one task each.
    pub async fn listen(&self) -> io::Result<()> {
        let tcp_listener = self
            .tcp_listener
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no listener bound"))?;
        info!(addr = ?tcp_listener.local_addr()?, "websocket relay listening");

        loop {
            match tcp_listener.accept().await {
                Ok((stream, peer)) => {
                    tokio::spawn(Self::stream_worker(stream, peer, self.relay.clone()));
                }
                Err(e) => warn!(error = %e, "failed to accept connection"),
            }
        }
    }

    async fn stream_worker(stream: TcpStream, peer: SocketAddr, relay: Arc<Relay>) {
        let websocket = match accept_async(stream).await {
            Ok(websocket) => websocket,
            Err(e) => {
                warn!(%peer, error = %e, "websocket handshake failed");
                return;
            }
        };
        let (sink, stream) = websocket.split();

        let mut stream_adapter = WSStream { stream };
        let sink_adapter = WSSink { sink };

        relay.handle_stream(&mut stream_adapter, sink_adapter).await;
    }
}

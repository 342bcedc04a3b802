
use crate::config::RelayConfig;
use crate::connection::{SinkAdapter, StreamAdapter};
use crate::error::TransportError;
use crate::relay::Relay;
use crate::response::Response;
use async_trait::async_trait;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use axum::extract::WebSocketUpgrade;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;

pub struct AxumWSSink {
    sink: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl SinkAdapter for AxumWSSink {
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

pub struct AxumWSStream {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl StreamAdapter for AxumWSStream {
    async fn next(&mut self) -> Option<Result<String, TransportError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Relay mounted as a websocket route on an axum router.
pub struct AxumRelay {
    relay: Arc<Relay>,
}

impl AxumRelay {
    pub fn new(config: RelayConfig) -> Self {
        AxumRelay {
            relay: Arc::new(Relay::new(config)),
        }
    }

    pub fn relay(&self) -> Arc<Relay> {
        self.relay.clone()
    }

    pub async fn ws_handler(ws: WebSocketUpgrade, relay: Arc<Relay>) -> impl IntoResponse {
        ws.on_upgrade(|socket| async move {
            let (sink, stream) = socket.split();

            let mut stream_adapter = AxumWSStream { stream };
            let sink_adapter = AxumWSSink { sink };

            relay.handle_stream(&mut stream_adapter, sink_adapter).await;
        })
    }

    pub fn attach_router(&self, path: &str, router: Router) -> Router {
        let relay = self.relay.clone();
        router.route(
            path,
            get(move |ws: WebSocketUpgrade| AxumRelay::ws_handler(ws, relay)),
        )
    }
}

//! Protocol handler and per-connection read loop, shared by every transport.

pub mod axum;
pub mod mpsc;
pub mod ws;

use crate::client::Client;
use crate::config::RelayConfig;
use crate::connection::{spawn_writer, Outbox, SinkAdapter, StreamAdapter};
use crate::error::ProtocolError;
use crate::message::{ClientMessage, JoinRequest, PostRequest, UserInfo};
use crate::registry::RoomRegistry;
use crate::response::Response;
use crate::utils::{generate_guest_id, get_id};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Transport-independent core of the server.
///
/// Owns the room registry; transports hand each accepted connection to
/// [`Relay::handle_stream`].
pub struct Relay {
    registry: Arc<RoomRegistry>,
    config: RelayConfig,
}

impl Default for Relay {
    fn default() -> Self {
        Relay::new(RelayConfig::default())
    }
}

impl Relay {
    pub fn new(config: RelayConfig) -> Self {
        Relay {
            registry: Arc::new(RoomRegistry::new(config.clone())),
            config,
        }
    }

    pub fn registry(&self) -> Arc<RoomRegistry> {
        self.registry.clone()
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Serves one connection until the peer goes away or its writer gives up.
    ///
    /// However the loop ends, the client leaves its room before this returns.
    pub async fn handle_stream<S, K>(&self, stream: &mut S, sink: K)
    where
        S: StreamAdapter,
        K: SinkAdapter,
    {
        let client_id = get_id();
        let (outbox, receiver) = Outbox::channel(client_id, self.config.outbound_buffer);
        let mut writer = spawn_writer(client_id, sink, receiver, self.config.send_timeout);

        let mut client = Client::new(client_id, outbox);
        info!(client_id, "connection opened");

        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(frame)) => self.handle_frame(&mut client, &frame).await,
                    Some(Err(e)) => {
                        debug!(client_id, error = %e, "read failed");
                        break;
                    }
                    None => break,
                },
                // the writer only stops on its own after a failed or timed-out write
                _ = &mut writer => {
                    debug!(client_id, state = ?client.state(), "writer stopped, dropping connection");
                    break;
                }
            }
        }

        self.registry.leave(&mut client).await;
        client.close();
        info!(client_id, state = ?client.state(), "connection closed");
    }

    /// Decodes and dispatches one inbound frame. Bad frames are logged and dropped.
    pub async fn handle_frame(&self, client: &mut Client, frame: &str) {
        match ClientMessage::decode(frame) {
            Ok(ClientMessage::Join(request)) => self.handle_join(client, request).await,
            Ok(ClientMessage::Message(request)) => self.handle_post(client, request).await,
            Err(ProtocolError::UnknownType(kind)) => {
                warn!(client_id = client.id(), kind = %kind, "ignoring unknown envelope type");
            }
            Err(e) => {
                warn!(client_id = client.id(), error = %e, "dropping malformed envelope");
            }
        }
    }

    async fn handle_join(&self, client: &mut Client, request: JoinRequest) {
        let user = profile_for(client, &request);
        if let Err(e) = self.registry.join(client, &request, user).await {
            info!(
                client_id = client.id(),
                room_id = %request.room_id,
                error = %e,
                "join rejected"
            );
            reply(client, Response::Error(e));
        }
    }

    async fn handle_post(&self, client: &mut Client, request: PostRequest) {
        if let Err(e) = self.registry.post(client, request.text).await {
            debug!(client_id = client.id(), error = %e, "post rejected");
            reply(client, Response::Error(e));
        }
    }
}

/// Profile to use for this join; a missing user id falls back to the one this
/// connection already has, or a fresh guest id.
fn profile_for(client: &Client, request: &JoinRequest) -> UserInfo {
    let mut user = request.user_info.clone();
    if user.user_id.is_empty() {
        user.user_id = if client.user().user_id.is_empty() {
            generate_guest_id()
        } else {
            client.user().user_id.clone()
        };
    }
    user
}

fn reply(client: &Client, response: Response) {
    if let Err(e) = client.outbox().deliver(response) {
        warn!(client_id = client.id(), error = %e, "could not queue reply");
    }
}

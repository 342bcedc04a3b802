//! Room registry: maps room ids to live rooms.
//!
//! Lock order is always room, then registry. The registry lock is never held
//! while waiting for a room lock, and a room is removed from the map before
//! the lock of the leave that emptied it is released. A joiner that raced the
//! last leave therefore finds the room closed, retries, and gets a fresh room.

use crate::client::Client;
use crate::config::RelayConfig;
use crate::error::RoomError;
use crate::message::{JoinRequest, UserInfo};
use crate::response::ChatMessage;
use crate::room::{Member, Room};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub type SharedRoom = Arc<Mutex<Room>>;

enum Resolved {
    /// A new room was created with the joiner already inside.
    Created,
    Existing(SharedRoom),
}

pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, SharedRoom>>,
    config: RelayConfig,
}

impl RoomRegistry {
    pub fn new(config: RelayConfig) -> Self {
        RoomRegistry {
            rooms: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Puts `client` into the requested room, leaving its current room first.
    ///
    /// A join naming the client's current room only replays the history. On
    /// failure the client ends up in no room.
    pub async fn join(
        &self,
        client: &mut Client,
        request: &JoinRequest,
        user: UserInfo,
    ) -> Result<(), RoomError> {
        if client.room_id() == Some(request.room_id.as_str()) && self.replay(client).await {
            debug!(room_id = %request.room_id, client_id = client.id(), "client already in room");
            return Ok(());
        }
        if client.room_id().is_some() {
            self.leave(client).await;
        }

        let member = Member::new(user.clone(), client.outbox().clone());
        loop {
            let room = match self.resolve(request, &member).await? {
                Resolved::Created => break,
                Resolved::Existing(room) => room,
            };

            let mut room = room.lock().await;
            if room.is_closed() {
                debug!(room_id = %request.room_id, "room released during join, retrying");
                continue;
            }
            room.join(member.clone(), request.password.as_deref())?;
            break;
        }

        client.enter(request.room_id.clone(), user);
        info!(room_id = %request.room_id, client_id = client.id(), "client joined room");
        Ok(())
    }

    /// Removes `client` from its room, releasing the room if it is now empty.
    ///
    /// Returns `false` if the client was not in a room.
    pub async fn leave(&self, client: &mut Client) -> bool {
        let Some(room_id) = client.exit() else {
            return false;
        };
        let Some(room) = self.lookup(&room_id).await else {
            return false;
        };

        let mut guard = room.lock().await;
        guard.leave(client.id());
        info!(room_id = %room_id, client_id = client.id(), "client left room");

        if guard.is_empty() && !guard.is_closed() {
            guard.close();
            self.release(&room_id, &room).await;
        }
        true
    }

    async fn replay(&self, client: &Client) -> bool {
        let Some(room_id) = client.room_id() else {
            return false;
        };
        let Some(room) = self.lookup(room_id).await else {
            return false;
        };

        let room = room.lock().await;
        !room.is_closed() && room.replay(client.id())
    }

    /// Appends a chat message to the client's room and broadcasts it.
    pub async fn post(&self, client: &Client, text: String) -> Result<ChatMessage, RoomError> {
        let room_id = client.room_id().ok_or(RoomError::NotJoined)?;
        let room = self.lookup(room_id).await.ok_or(RoomError::NotJoined)?;

        let mut room = room.lock().await;
        if room.is_closed() {
            return Err(RoomError::NotJoined);
        }
        room.post(client.id(), text)
    }

    /// Returns the existing room, or atomically creates one around `founder`.
    async fn resolve(
        &self,
        request: &JoinRequest,
        founder: &Member,
    ) -> Result<Resolved, RoomError> {
        let mut rooms = self.rooms.lock().await;

        if let Some(room) = rooms.get(&request.room_id) {
            if self.config.strict_create && request.create == Some(true) {
                return Err(RoomError::RoomExists(request.room_id.clone()));
            }
            return Ok(Resolved::Existing(room.clone()));
        }

        if self.config.strict_create && request.create == Some(false) {
            return Err(RoomError::RoomNotFound(request.room_id.clone()));
        }

        let password = request.founding_password();
        let protected = password.is_some();
        let mut room = Room::new(
            request.room_id.clone(),
            password,
            self.config.history_limit,
        );
        room.join(founder.clone(), request.password.as_deref())?;
        rooms.insert(request.room_id.clone(), Arc::new(Mutex::new(room)));

        info!(room_id = %request.room_id, protected, "room created");
        Ok(Resolved::Created)
    }

    /// Drops `room` from the map, unless the id already points at a newer room.
    ///
    /// Caller must hold the room's lock and have marked it closed.
    async fn release(&self, room_id: &str, room: &SharedRoom) {
        let mut rooms = self.rooms.lock().await;
        if rooms
            .get(room_id)
            .is_some_and(|current| Arc::ptr_eq(current, room))
        {
            rooms.remove(room_id);
            info!(room_id, "room released");
        }
    }

    async fn lookup(&self, room_id: &str) -> Option<SharedRoom> {
        self.rooms.lock().await.get(room_id).cloned()
    }

    pub async fn contains(&self, room_id: &str) -> bool {
        self.rooms.lock().await.contains_key(room_id)
    }

    pub async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.lock().await.is_empty()
    }

    pub async fn room_ids(&self) -> Vec<String> {
        self.rooms.lock().await.keys().cloned().collect()
    }

    pub async fn member_count(&self, room_id: &str) -> Option<usize> {
        let room = self.lookup(room_id).await?;
        let room = room.lock().await;
        Some(room.len())
    }

    pub async fn history(&self, room_id: &str) -> Option<Vec<ChatMessage>> {
        let room = self.lookup(room_id).await?;
        let room = room.lock().await;
        Some(room.history())
    }
}

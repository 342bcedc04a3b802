//! This module defines the `Client` struct, the server-side record of one connection.

use crate::connection::Outbox;
use crate::message::UserInfo;

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Accepted, not in any room.
    Open,
    /// Member of exactly one room.
    Active,
    Closed,
}

/// A connected participant.
///
/// The current room is only ever changed by the room registry as part of a
/// successful join or a leave, which keeps it in step with room membership.
#[derive(Debug)]
pub struct Client {
    id: u64,
    room_id: Option<String>,
    user: UserInfo,
    outbox: Outbox,
    closed: bool,
}

impl Client {
    pub fn new(id: u64, outbox: Outbox) -> Self {
        Client {
            id,
            room_id: None,
            user: UserInfo::default(),
            outbox,
            closed: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    /// Profile given on the most recent successful join.
    pub fn user(&self) -> &UserInfo {
        &self.user
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn state(&self) -> ConnectionState {
        if self.closed {
            ConnectionState::Closed
        } else if self.room_id.is_some() {
            ConnectionState::Active
        } else {
            ConnectionState::Open
        }
    }

    pub(crate) fn enter(&mut self, room_id: String, user: UserInfo) {
        self.room_id = Some(room_id);
        self.user = user;
    }

    pub(crate) fn exit(&mut self) -> Option<String> {
        self.room_id.take()
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
    }
}

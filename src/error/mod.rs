//! Error types, one enum per concern.
//!
//! `RoomError` is the only one a client ever sees (as an `error` envelope);
//! the rest are logged at the point where they are handled.

use thiserror::Error;

/// Admission and posting failures reported back to the offending client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// The room has a password and the join did not supply the matching one.
    #[error("room {0} requires a password")]
    PasswordRequired(String),
    /// A chat message was posted without being a member of any room.
    #[error("join a room before sending messages")]
    NotJoined,
    /// Strict creation: `create` was requested for a room that already exists.
    #[error("room {0} already exists")]
    RoomExists(String),
    /// Strict creation: an explicit non-creating join named an unknown room.
    #[error("room {0} does not exist")]
    RoomNotFound(String),
}

impl RoomError {
    /// Stable sentinel carried in the `code` field of the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            RoomError::PasswordRequired(_) => "password_required",
            RoomError::NotJoined => "not_joined",
            RoomError::RoomExists(_) => "room_exists",
            RoomError::RoomNotFound(_) => "room_not_found",
        }
    }
}

/// Reasons an inbound frame is dropped by the protocol handler.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not a valid envelope: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("unknown envelope type {0:?}")]
    UnknownType(String),
    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{kind} payload is missing {field}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
}

/// Failures of the underlying socket.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error("axum websocket error: {0}")]
    Axum(#[from] axum::Error),
    #[error("failed to encode envelope: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("peer channel closed")]
    Closed,
}

/// Failure to enqueue an envelope on a connection's outbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("outbox is full")]
    Full,
    #[error("outbox is closed")]
    Closed,
}

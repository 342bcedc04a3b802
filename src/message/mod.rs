//! This module contains the inbound side of the wire protocol: the `{type, payload}`
//! envelope, the user profile carried by joins and the decoded `ClientMessage`.

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const JOIN_TYPE: &str = "join";
const MESSAGE_TYPE: &str = "message";

/// Raw envelope as it arrives on the socket, before the payload is interpreted.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

/// Profile a client presents when joining a room.
///
/// Every field is optional on the wire; the server never checks `user_id`
/// for uniqueness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub nick_name: String,
    #[serde(default)]
    pub avatar_url: String,
}

impl UserInfo {
    pub fn new(user_id: impl Into<String>, nick_name: impl Into<String>) -> Self {
        UserInfo {
            user_id: user_id.into(),
            nick_name: nick_name.into(),
            avatar_url: String::new(),
        }
    }

    /// Name shown in system notices.
    pub fn display_name(&self) -> &str {
        if self.nick_name.is_empty() {
            "Unknown"
        } else {
            &self.nick_name
        }
    }
}

/// Payload of a `join` envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub password: Option<String>,
    /// `None` when the field was absent, which matters in strict creation mode.
    #[serde(default)]
    pub create: Option<bool>,
    #[serde(default)]
    pub user_info: UserInfo,
}

impl JoinRequest {
    pub fn new(room_id: impl Into<String>, user_info: UserInfo) -> Self {
        JoinRequest {
            room_id: room_id.into(),
            password: None,
            create: None,
            user_info,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_create(mut self, create: bool) -> Self {
        self.create = Some(create);
        self
    }

    /// The password this join would fix on a room it creates, if any.
    pub(crate) fn founding_password(&self) -> Option<String> {
        match (&self.create, &self.password) {
            (Some(true), Some(password)) if !password.is_empty() => Some(password.clone()),
            _ => None,
        }
    }
}

/// Payload of a client `message` envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostRequest {
    pub text: String,
}

/// A fully decoded inbound envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Join(JoinRequest),
    Message(PostRequest),
}

impl ClientMessage {
    /// Decodes one text frame.
    ///
    /// Anything that is not a well-formed `join` or `message` envelope is an
    /// error; callers log and drop it.
    pub fn decode(frame: &str) -> Result<ClientMessage, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(frame).map_err(ProtocolError::Malformed)?;

        match envelope.kind.as_str() {
            JOIN_TYPE => {
                let request: JoinRequest = serde_json::from_value(envelope.payload).map_err(
                    |source| ProtocolError::InvalidPayload {
                        kind: JOIN_TYPE,
                        source,
                    },
                )?;
                if request.room_id.is_empty() {
                    return Err(ProtocolError::MissingField {
                        kind: JOIN_TYPE,
                        field: "roomId",
                    });
                }
                Ok(ClientMessage::Join(request))
            }
            MESSAGE_TYPE => {
                let request: PostRequest = serde_json::from_value(envelope.payload).map_err(
                    |source| ProtocolError::InvalidPayload {
                        kind: MESSAGE_TYPE,
                        source,
                    },
                )?;
                Ok(ClientMessage::Message(request))
            }
            _ => Err(ProtocolError::UnknownType(envelope.kind)),
        }
    }
}

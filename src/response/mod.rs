
use crate::error::RoomError;
use crate::message::UserInfo;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};

/// One accepted chat message, as broadcast and as kept in room history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub sender: UserInfo,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>, sender: UserInfo) -> Self {
        ChatMessage {
            text: text.into(),
            sender,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    History,
    Message,
    System,
    Error,
}

/// Server to client envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Replayed once to a newly admitted member, oldest first.
    History(Vec<ChatMessage>),
    Message(ChatMessage),
    System(String),
    Error(RoomError),
}

impl Response {
    pub fn kind(&self) -> ResponseKind {
        match self {
            Response::History(_) => ResponseKind::History,
            Response::Message(_) => ResponseKind::Message,
            Response::System(_) => ResponseKind::System,
            Response::Error(_) => ResponseKind::Error,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Response::System(text.into())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

const RESPONSE_STR: &str = "response";
const TYPE_STR: &str = "type";
const PAYLOAD_STR: &str = "payload";
const TEXT_STR: &str = "text";
const CODE_STR: &str = "code";

struct NoticePayload<'a> {
    text: &'a str,
}

impl Serialize for NoticePayload<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        let mut s = serializer.serialize_struct(PAYLOAD_STR, 1)?;
        s.serialize_field(TEXT_STR, self.text)?;
        s.end()
    }
}

struct ErrorPayload<'a> {
    error: &'a RoomError,
}

impl Serialize for ErrorPayload<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        let mut s = serializer.serialize_struct(PAYLOAD_STR, 2)?;
        s.serialize_field(TEXT_STR, &self.error.to_string())?;
        s.serialize_field(CODE_STR, self.error.code())?;
        s.end()
    }
}

impl Serialize for Response {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        let mut s = serializer.serialize_struct(RESPONSE_STR, 2)?;
        s.serialize_field(TYPE_STR, &self.kind())?;
        match self {
            Response::History(messages) => {
                s.serialize_field(PAYLOAD_STR, messages)?;
            }
            Response::Message(message) => {
                s.serialize_field(PAYLOAD_STR, message)?;
            }
            Response::System(text) => {
                s.serialize_field(PAYLOAD_STR, &NoticePayload { text })?;
            }
            Response::Error(error) => {
                s.serialize_field(PAYLOAD_STR, &ErrorPayload { error })?;
            }
        }
        s.end()
    }
}


use crate::connection::Outbox;
use crate::error::RoomError;
use crate::message::UserInfo;
use crate::response::{ChatMessage, Response};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

/// A connection as seen from inside a room.
#[derive(Debug, Clone)]
pub struct Member {
    pub client_id: u64,
    pub user: UserInfo,
    outbox: Outbox,
}

impl Member {
    pub fn new(user: UserInfo, outbox: Outbox) -> Self {
        Member {
            client_id: outbox.client_id(),
            user,
            outbox,
        }
    }

    fn deliver(&self, room_id: &str, response: Response) -> bool {
        match self.outbox.deliver(response) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    room_id,
                    client_id = self.client_id,
                    error = %e,
                    "dropping envelope for member"
                );
                false
            }
        }
    }
}

/// A named broadcast group.
///
/// All methods are synchronous and never wait on a socket; the registry keeps
/// each room behind its own mutex so they are serialized per room.
#[derive(Debug)]
pub struct Room {
    id: String,
    password: Option<String>,
    members: HashMap<u64, Member>,
    history: VecDeque<ChatMessage>,
    history_limit: usize,
    closed: bool,
}

impl Room {
    pub fn new(id: impl Into<String>, password: Option<String>, history_limit: usize) -> Self {
        Room {
            id: id.into(),
            password,
            members: HashMap::new(),
            history: VecDeque::new(),
            history_limit,
            closed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, client_id: u64) -> bool {
        self.members.contains_key(&client_id)
    }

    pub fn history(&self) -> Vec<ChatMessage> {
        self.history.iter().cloned().collect()
    }

    /// A closed room has been released from the registry and must not be joined.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    /// Admits `member` if `password` matches the room's password (if it has one).
    ///
    /// On success the joiner gets the history and a welcome notice before
    /// anything else from this room, and everyone else gets a join notice.
    pub fn join(&mut self, member: Member, password: Option<&str>) -> Result<(), RoomError> {
        if let Some(expected) = &self.password {
            if password != Some(expected.as_str()) {
                return Err(RoomError::PasswordRequired(self.id.clone()));
            }
        }

        self.welcome(&member);

        let notice = Response::system(format!("{} joined the room", member.user.display_name()));
        self.broadcast_except(&notice, member.client_id);

        debug!(room_id = %self.id, client_id = member.client_id, "member joined");
        self.members.insert(member.client_id, member);
        Ok(())
    }

    /// Sends history and the welcome notice to an existing member again.
    ///
    /// Returns `false` if `client_id` is not a member.
    pub fn replay(&self, client_id: u64) -> bool {
        match self.members.get(&client_id) {
            Some(member) => {
                self.welcome(member);
                true
            }
            None => false,
        }
    }

    fn welcome(&self, member: &Member) {
        member.deliver(&self.id, Response::History(self.history()));
        member.deliver(&self.id, Response::system(format!("Joined room {}", self.id)));
    }

    /// Removes a member, telling the rest of the room if anyone is left.
    pub fn leave(&mut self, client_id: u64) -> Option<Member> {
        let member = self.members.remove(&client_id)?;
        debug!(room_id = %self.id, client_id, "member left");

        if !self.members.is_empty() {
            let notice =
                Response::system(format!("{} left the room", member.user.display_name()));
            self.broadcast(&notice);
        }
        Some(member)
    }

    /// Records a chat message and echoes it to every member, sender included.
    pub fn post(&mut self, client_id: u64, text: String) -> Result<ChatMessage, RoomError> {
        let sender = self
            .members
            .get(&client_id)
            .ok_or(RoomError::NotJoined)?
            .user
            .clone();

        let message = ChatMessage::new(text, sender);
        self.history.push_back(message.clone());
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }

        self.broadcast(&Response::Message(message.clone()));
        Ok(message)
    }

    /// Best-effort fan-out; returns how many members accepted the envelope.
    pub fn broadcast(&self, response: &Response) -> usize {
        self.members
            .values()
            .filter(|member| member.deliver(&self.id, response.clone()))
            .count()
    }

    fn broadcast_except(&self, response: &Response, client_id: u64) -> usize {
        self.members
            .values()
            .filter(|member| member.client_id != client_id)
            .filter(|member| member.deliver(&self.id, response.clone()))
            .count()
    }
}

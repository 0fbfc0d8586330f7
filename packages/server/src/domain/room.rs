//! Room state machine.
//!
//! `Room` is pure: it decides who gets which event, but never touches a
//! queue or a socket. The room event loop in the infrastructure layer owns a
//! `Room` and performs the actual deliveries, so every mutation below runs in
//! that single serialized context.

use std::sync::Arc;

use super::{
    entity::{Member, SessionState},
    error::RoomError,
    event::{EventPayload, RoomEvent},
    value_object::{ClientId, Role, RoomId, Timestamp},
};

/// Maximum number of concurrently registered participants per room
pub const ROOM_CAPACITY: usize = 2;

const ROOM_FULL_MESSAGE: &str = "Room is full";

/// An event paired with the members it must be delivered to
#[derive(Debug, Clone)]
pub struct Delivery {
    pub event: Arc<RoomEvent>,
    pub recipients: Vec<ClientId>,
}

/// Result of a successful admission
#[derive(Debug, Clone)]
pub struct Admission {
    pub member: Member,
    /// Snapshot for the new member only
    pub sync: Delivery,
    /// Arrival announcement for every member, the new one included
    pub join: Delivery,
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    members: Vec<Member>,
    session: SessionState,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            created_at,
            members: Vec::with_capacity(ROOM_CAPACITY),
            session: SessionState::default(),
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= ROOM_CAPACITY
    }

    pub fn member(&self, client_id: &ClientId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == client_id)
    }

    /// Add a participant if there is room for one.
    ///
    /// The first member of an empty room is the Author; anyone joining an
    /// occupied room is a Collaborator.
    pub fn admit(
        &mut self,
        client_id: ClientId,
        joined_at: Timestamp,
    ) -> Result<Admission, RoomError> {
        if self.member(&client_id).is_some() {
            return Err(RoomError::AlreadyMember(client_id.into_string()));
        }
        if self.is_full() {
            return Err(RoomError::Full);
        }

        let role = if self.members.is_empty() {
            Role::Author
        } else {
            Role::Collaborator
        };
        let member = Member::new(client_id, role, joined_at);
        let others = self.members.clone();
        self.members.push(member.clone());

        let sync = Delivery {
            event: Arc::new(self.event_from(
                &member,
                EventPayload::Sync {
                    session: self.session.clone(),
                    connected_users: others,
                },
            )),
            recipients: vec![member.id.clone()],
        };
        let join = Delivery {
            event: Arc::new(self.event_from(
                &member,
                EventPayload::Join {
                    connected_users: self.members.clone(),
                },
            )),
            recipients: self.member_ids(),
        };

        Ok(Admission { member, sync, join })
    }

    /// Remove a participant. Returns the `leave` announcement for the
    /// remaining members, or `None` if `client_id` was not a member.
    pub fn dismiss(&mut self, client_id: &ClientId) -> Option<Delivery> {
        let index = self.members.iter().position(|m| &m.id == client_id)?;
        let departed = self.members.remove(index);

        Some(Delivery {
            event: Arc::new(self.event_from(
                &departed,
                EventPayload::Leave {
                    connected_users: self.members.clone(),
                },
            )),
            recipients: self.member_ids(),
        })
    }

    /// Apply an event sent by a member and decide who receives it.
    ///
    /// Returns `None` when the event must be dropped: the sender is not a
    /// member, the kind is server-originated (`error`, `execution_output`),
    /// or a signaling target is absent.
    pub fn ingest(&mut self, from: &ClientId, payload: EventPayload) -> Option<Delivery> {
        let sender = self.member(from)?.clone();

        let direct = match &payload {
            EventPayload::Signal { target, .. } => Some(self.member(target)?.id.clone()),
            EventPayload::Error { .. } | EventPayload::ExecutionOutput { .. } => return None,
            EventPayload::Code { content, problem } => {
                self.session.code = content.clone();
                self.session.problem.merge_from(problem);
                None
            }
            EventPayload::LanguageChange { language } => {
                self.session.language = language.clone();
                None
            }
            _ => None,
        };

        let recipients = match direct {
            Some(target) => vec![target],
            None if payload.echoes_to_sender() => self.member_ids(),
            None => self.member_ids_except(from),
        };

        Some(Delivery {
            event: Arc::new(self.event_from(&sender, payload)),
            recipients,
        })
    }

    /// Fan out a server-originated event to every member.
    ///
    /// `attributed_to` names the client the event is about; its role is
    /// filled in when that client is a member.
    pub fn announce(
        &self,
        attributed_to: Option<ClientId>,
        payload: EventPayload,
    ) -> Option<Delivery> {
        if !payload.is_broadcastable() || self.members.is_empty() {
            return None;
        }
        let role = attributed_to
            .as_ref()
            .and_then(|id| self.member(id))
            .map(|m| m.role);

        Some(Delivery {
            event: Arc::new(RoomEvent {
                room_id: self.id.clone(),
                sender: attributed_to,
                role,
                payload,
            }),
            recipients: self.member_ids(),
        })
    }

    /// Error event sent to a candidate turned away from a full room
    ///
    /// The candidate never became a member, so the event names no sender.
    pub fn rejection(&self) -> RoomEvent {
        RoomEvent {
            room_id: self.id.clone(),
            sender: None,
            role: None,
            payload: EventPayload::Error {
                message: ROOM_FULL_MESSAGE.to_string(),
            },
        }
    }

    fn event_from(&self, member: &Member, payload: EventPayload) -> RoomEvent {
        RoomEvent {
            room_id: self.id.clone(),
            sender: Some(member.id.clone()),
            role: Some(member.role),
            payload,
        }
    }

    fn member_ids(&self) -> Vec<ClientId> {
        self.members.iter().map(|m| m.id.clone()).collect()
    }

    fn member_ids_except(&self, exclude: &ClientId) -> Vec<ClientId> {
        self.members
            .iter()
            .filter(|m| &m.id != exclude)
            .map(|m| m.id.clone())
            .collect()
    }
}

//! Room events.
//!
//! The wire format is a flat object of optional fields. Internally an event is
//! a tagged union: [`EventPayload`] carries only what its kind needs.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{
    entity::{Member, ProblemFields, SessionState},
    value_object::{ClientId, Role, RoomId},
};

/// Point-to-point WebRTC negotiation message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

/// Kind-specific content of a room event
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// A participant was admitted. Carries the roster after admission.
    Join { connected_users: Vec<Member> },
    /// A participant left. Carries the remaining roster.
    Leave { connected_users: Vec<Member> },
    /// Snapshot for a newly admitted participant. The roster excludes them.
    Sync {
        session: SessionState,
        connected_users: Vec<Member>,
    },
    Code {
        content: String,
        problem: ProblemFields,
    },
    Chat { content: String },
    LanguageChange { language: String },
    Error { message: String },
    Signal {
        kind: SignalKind,
        target: ClientId,
        sdp: Option<serde_json::Value>,
        ice_candidate: Option<serde_json::Value>,
    },
    /// Result of a code run, posted by the execution endpoint.
    ExecutionOutput { result: serde_json::Value },
}

impl EventPayload {
    /// Code and language changes are never echoed back to their originator.
    pub fn echoes_to_sender(&self) -> bool {
        !matches!(
            self,
            EventPayload::Code { .. } | EventPayload::LanguageChange { .. }
        )
    }

    /// Kinds that clients may ask the room to fan out.
    pub fn is_broadcastable(&self) -> bool {
        !matches!(self, EventPayload::Error { .. } | EventPayload::Signal { .. })
    }
}

/// An immutable event as seen by recipients
#[derive(Debug, Clone, PartialEq)]
pub struct RoomEvent {
    pub room_id: RoomId,
    /// Originating client. `None` for events produced by the server itself.
    pub sender: Option<ClientId>,
    pub role: Option<Role>,
    pub payload: EventPayload,
}

/// Items placed on a client's outbound queue
#[derive(Debug, Clone)]
pub enum Outbound {
    Event(Arc<RoomEvent>),
    /// Liveness probe; the outbound pump turns it into a WebSocket ping.
    Probe,
}

/// Sending half of a client's bounded outbound queue.
///
/// Once a client is admitted the room owns this sender. Dropping it closes
/// the queue, which is the unified shutdown signal for the connection.
pub type PusherChannel = mpsc::Sender<Outbound>;

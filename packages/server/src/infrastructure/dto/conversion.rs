//! Conversion logic between DTOs and domain types.
//!
//! Inbound frames become [`EventPayload`]s; the sender's `user_id`,
//! `room_id` and `role` are ignored since the connection already knows who
//! it is. Outbound [`RoomEvent`]s are flattened back into [`WireMessage`]s.

use thiserror::Error;

use crate::domain::{
    EventPayload, Member, ProblemFields, RoomEvent, SessionState, SignalKind,
    error::ValueObjectError, value_object::ClientId,
};
use crate::infrastructure::dto::websocket::{ConnectedUser, MessageType, WireMessage};

/// Reasons an inbound frame is discarded
#[derive(Debug, Error, PartialEq)]
pub enum WireMessageError {
    #[error("frame is not valid JSON of the expected shape: {0}")]
    Malformed(String),

    #[error("'{0}' content must be a string")]
    NonTextContent(&'static str),

    #[error("signaling message without target_user_id")]
    MissingTarget,

    #[error("invalid target_user_id: {0}")]
    InvalidTarget(#[from] ValueObjectError),
}

impl WireMessage {
    /// Parse one text frame.
    pub fn parse(text: &str) -> Result<Self, WireMessageError> {
        serde_json::from_str(text).map_err(|e| WireMessageError::Malformed(e.to_string()))
    }
}

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<WireMessage> for EventPayload {
    type Error = WireMessageError;

    fn try_from(msg: WireMessage) -> Result<Self, WireMessageError> {
        let payload = match msg.r#type {
            MessageType::Join => EventPayload::Join {
                connected_users: Vec::new(),
            },
            MessageType::Leave => EventPayload::Leave {
                connected_users: Vec::new(),
            },
            MessageType::Sync => {
                let problem = problem_fields(&msg);
                EventPayload::Sync {
                    session: SessionState {
                        code: text_content(msg.content, "sync")?,
                        language: msg.language.unwrap_or_default(),
                        problem,
                    },
                    connected_users: Vec::new(),
                }
            }
            MessageType::Code => {
                let problem = problem_fields(&msg);
                EventPayload::Code {
                    content: text_content(msg.content, "code")?,
                    problem,
                }
            }
            MessageType::Chat => EventPayload::Chat {
                content: text_content(msg.content, "chat")?,
            },
            MessageType::LanguageChange => EventPayload::LanguageChange {
                language: msg.language.unwrap_or_default(),
            },
            MessageType::Error => EventPayload::Error {
                message: text_content(msg.content, "error")?,
            },
            MessageType::Offer => signal(SignalKind::Offer, msg)?,
            MessageType::Answer => signal(SignalKind::Answer, msg)?,
            MessageType::IceCandidate => signal(SignalKind::IceCandidate, msg)?,
            MessageType::ExecutionOutput => EventPayload::ExecutionOutput {
                result: msg.content.unwrap_or(serde_json::Value::Null),
            },
        };
        Ok(payload)
    }
}

fn text_content(
    content: Option<serde_json::Value>,
    kind: &'static str,
) -> Result<String, WireMessageError> {
    match content {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(_) => Err(WireMessageError::NonTextContent(kind)),
    }
}

fn problem_fields(msg: &WireMessage) -> ProblemFields {
    ProblemFields {
        title: msg.problem_title.clone(),
        description: msg.problem_description.clone(),
        meta: msg.question_meta.clone(),
        hints: msg.question_hints.clone(),
        snippets: msg.question_snippets.clone(),
    }
}

fn signal(kind: SignalKind, msg: WireMessage) -> Result<EventPayload, WireMessageError> {
    let target = msg
        .target_user_id
        .filter(|t| !t.is_empty())
        .ok_or(WireMessageError::MissingTarget)?;
    Ok(EventPayload::Signal {
        kind,
        target: ClientId::new(target)?,
        sdp: msg.sdp,
        ice_candidate: msg.ice_candidate,
    })
}

// ========================================
// Domain → DTO
// ========================================

impl From<&Member> for ConnectedUser {
    fn from(member: &Member) -> Self {
        Self {
            user_id: member.id.as_str().to_string(),
            role: member.role.as_str().to_string(),
        }
    }
}

impl From<&RoomEvent> for WireMessage {
    fn from(event: &RoomEvent) -> Self {
        let mut msg = WireMessage::new(message_type(&event.payload));
        msg.room_id = Some(event.room_id.as_str().to_string());
        msg.user_id = event.sender.as_ref().map(|id| id.as_str().to_string());
        msg.role = event.role.map(|role| role.as_str().to_string());

        match &event.payload {
            EventPayload::Join { connected_users } | EventPayload::Leave { connected_users } => {
                msg.connected_users = Some(roster(connected_users));
            }
            EventPayload::Sync {
                session,
                connected_users,
            } => {
                // sync always carries the code, even when nothing was typed yet
                msg.content = Some(serde_json::Value::String(session.code.clone()));
                msg.language = Some(session.language.clone()).filter(|l| !l.is_empty());
                apply_problem(&mut msg, &session.problem);
                msg.connected_users = Some(roster(connected_users));
            }
            EventPayload::Code { content, problem } => {
                msg.content = Some(serde_json::Value::String(content.clone()));
                apply_problem(&mut msg, problem);
            }
            EventPayload::Chat { content } => {
                msg.content = Some(serde_json::Value::String(content.clone()));
            }
            EventPayload::LanguageChange { language } => {
                msg.language = Some(language.clone());
            }
            EventPayload::Error { message } => {
                msg.content = Some(serde_json::Value::String(message.clone()));
            }
            EventPayload::Signal {
                target,
                sdp,
                ice_candidate,
                ..
            } => {
                msg.target_user_id = Some(target.as_str().to_string());
                msg.sdp = sdp.clone();
                msg.ice_candidate = ice_candidate.clone();
            }
            EventPayload::ExecutionOutput { result } => {
                msg.content = Some(result.clone());
            }
        }
        msg
    }
}

fn message_type(payload: &EventPayload) -> MessageType {
    match payload {
        EventPayload::Join { .. } => MessageType::Join,
        EventPayload::Leave { .. } => MessageType::Leave,
        EventPayload::Sync { .. } => MessageType::Sync,
        EventPayload::Code { .. } => MessageType::Code,
        EventPayload::Chat { .. } => MessageType::Chat,
        EventPayload::LanguageChange { .. } => MessageType::LanguageChange,
        EventPayload::Error { .. } => MessageType::Error,
        EventPayload::Signal { kind, .. } => match kind {
            SignalKind::Offer => MessageType::Offer,
            SignalKind::Answer => MessageType::Answer,
            SignalKind::IceCandidate => MessageType::IceCandidate,
        },
        EventPayload::ExecutionOutput { .. } => MessageType::ExecutionOutput,
    }
}

fn roster(members: &[Member]) -> Vec<ConnectedUser> {
    members.iter().map(ConnectedUser::from).collect()
}

fn apply_problem(msg: &mut WireMessage, problem: &ProblemFields) {
    msg.problem_title = problem.title.clone();
    msg.problem_description = problem.description.clone();
    msg.question_meta = problem.meta.clone();
    msg.question_hints = problem.hints.clone();
    msg.question_snippets = problem.snippets.clone();
}

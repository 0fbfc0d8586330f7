//! WebSocket frame DTO.
//!
//! Every frame in either direction is one JSON object of this shape. All
//! fields except `type` are optional and unknown fields are ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "join")]
    Join,
    #[serde(rename = "leave")]
    Leave,
    #[serde(rename = "sync")]
    Sync,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "chat")]
    Chat,
    #[serde(rename = "language_change")]
    LanguageChange,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "offer")]
    Offer,
    #[serde(rename = "answer")]
    Answer,
    #[serde(rename = "ice-candidate")]
    IceCandidate,
    #[serde(rename = "execution_output")]
    ExecutionOutput,
}

/// Roster entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedUser {
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub r#type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_meta: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_hints: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_snippets: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_users: Option<Vec<ConnectedUser>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdp: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ice_candidate: Option<serde_json::Value>,
}

impl WireMessage {
    /// A message of the given type with every optional field unset
    pub fn new(r#type: MessageType) -> Self {
        Self {
            r#type,
            room_id: None,
            user_id: None,
            role: None,
            content: None,
            problem_title: None,
            problem_description: None,
            question_meta: None,
            question_hints: None,
            question_snippets: None,
            connected_users: None,
            language: None,
            target_user_id: None,
            sdp: None,
            ice_candidate: None,
        }
    }
}

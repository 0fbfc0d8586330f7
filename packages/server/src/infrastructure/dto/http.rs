//! HTTP API request/response DTOs.
//!
//! Success bodies are wrapped as `{"data": ...}` and failures as
//! `{"error": "..."}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Member, Question, RoomHandle};
use duocode_shared::time::timestamp_to_rfc3339;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub room_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomCreatedDto {
    pub room_id: String,
    pub websocket_url: String,
}

impl RoomCreatedDto {
    pub fn new(room_id: String) -> Self {
        let websocket_url = format!("/ws?room_id={room_id}");
        Self {
            room_id,
            websocket_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub participant_count: usize,
    pub joinable: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub user_id: String,
    pub role: String,
    pub joined_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub participants: Vec<ParticipantDto>,
    pub joinable: bool,
    pub created_at: String,
}

impl From<&Member> for ParticipantDto {
    fn from(member: &Member) -> Self {
        Self {
            user_id: member.id.as_str().to_string(),
            role: member.role.as_str().to_string(),
            joined_at: timestamp_to_rfc3339(member.joined_at.value()),
        }
    }
}

impl RoomSummaryDto {
    pub fn from_handle(room: &dyn RoomHandle, capacity: usize) -> Self {
        let participant_count = room.member_count();
        Self {
            id: room.id().as_str().to_string(),
            participant_count,
            joinable: participant_count < capacity,
            created_at: timestamp_to_rfc3339(room.created_at().value()),
        }
    }
}

impl RoomDetailDto {
    pub fn from_handle(room: &dyn RoomHandle, capacity: usize) -> Self {
        let participants: Vec<ParticipantDto> =
            room.members().iter().map(ParticipantDto::from).collect();
        Self {
            id: room.id().as_str().to_string(),
            joinable: participants.len() < capacity,
            participants,
            created_at: timestamp_to_rfc3339(room.created_at().value()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuestionRequest {
    #[serde(alias = "questionTitleSlug")]
    pub keyword: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionDto {
    pub title: String,
    pub title_slug: String,
    pub description: String,
    pub difficulty: String,
    pub likes: i64,
    pub hints: Vec<String>,
    pub snippets: BTreeMap<String, String>,
    pub link: String,
}

impl From<Question> for QuestionDto {
    fn from(q: Question) -> Self {
        let link = format!("https://leetcode.com/problems/{}/", q.title_slug);
        Self {
            title: q.title,
            title_slug: q.title_slug,
            description: q.description,
            difficulty: q.difficulty,
            likes: q.likes,
            hints: q.hints,
            snippets: q.snippets,
            link,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExecuteCodeRequest {
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub stdin: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientId, Role, Timestamp, repository::MockRoomHandle};

    #[test]
    fn test_created_room_has_websocket_url() {
        // テスト項目: 作成したルームの接続先 URL が組み立てられる
        // given (前提条件):
        let room_id = "abc".to_string();

        // when (操作):
        let dto = RoomCreatedDto::new(room_id);

        // then (期待する結果):
        assert_eq!(dto.websocket_url, "/ws?room_id=abc");
    }

    #[test]
    fn test_room_detail_joinable_flag() {
        // テスト項目: 満室のルームは joinable = false になる
        // given (前提条件):
        let members = vec![
            Member::new(
                ClientId::new("a".to_string()).unwrap(),
                Role::Author,
                Timestamp::new(0),
            ),
            Member::new(
                ClientId::new("b".to_string()).unwrap(),
                Role::Collaborator,
                Timestamp::new(0),
            ),
        ];
        let room_id = crate::domain::RoomId::new("r".to_string()).unwrap();
        let mut room = MockRoomHandle::new();
        room.expect_id().return_const(room_id);
        room.expect_created_at().return_const(Timestamp::new(0));
        room.expect_members().returning(move || members.clone());

        // when (操作):
        let dto = RoomDetailDto::from_handle(&room, 2);

        // then (期待する結果):
        assert!(!dto.joinable);
        assert_eq!(dto.participants.len(), 2);
        assert_eq!(dto.participants[0].role, "Author");
        assert_eq!(dto.created_at, "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_execute_request_defaults() {
        // テスト項目: room_id / user_id / stdin は省略できる
        // given (前提条件):
        let raw = r#"{"language":"Python","code":"print(1)"}"#;

        // when (操作):
        let req: ExecuteCodeRequest = serde_json::from_str(raw).unwrap();

        // then (期待する結果):
        assert_eq!(req.room_id, None);
        assert_eq!(req.stdin, "");
    }
}

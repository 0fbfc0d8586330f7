//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    domain::{ClientId, CodeSubmission, ROOM_CAPACITY, RoomId},
    infrastructure::dto::http::{
        ApiResponse, CreateRoomRequest, ExecuteCodeRequest, QuestionDto, RoomCreatedDto,
        RoomDetailDto, RoomSummaryDto, SearchQuestionRequest,
    },
    ui::state::AppState,
    usecase::ExecutionRequest,
};

use super::error::ApiError;

/// Health check endpoint
pub async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::new("ok"))
}

/// Create a room. The body is optional; without a `room_id` one is generated.
pub async fn create_room(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<RoomCreatedDto>>), ApiError> {
    let request: CreateRoomRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateRoomRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))?
    };

    let room_id = request
        .room_id
        .filter(|id| !id.trim().is_empty())
        .map(RoomId::new)
        .transpose()?;

    let room_id = state.create_room_usecase.execute(room_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(RoomCreatedDto::new(room_id.into_string()))),
    ))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Vec<RoomSummaryDto>>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    let summaries = rooms
        .iter()
        .map(|room| RoomSummaryDto::from_handle(room.as_ref(), ROOM_CAPACITY))
        .collect();

    Json(ApiResponse::new(summaries))
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<ApiResponse<RoomDetailDto>>, ApiError> {
    let room_id = RoomId::new(room_id)?;
    let room = state.get_room_detail_usecase.execute(&room_id).await?;
    Ok(Json(ApiResponse::new(RoomDetailDto::from_handle(
        room.as_ref(),
        ROOM_CAPACITY,
    ))))
}

/// Look up a question by keyword or title slug
pub async fn search_question(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchQuestionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<QuestionDto>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let question = state
        .search_question_usecase
        .execute(&request.keyword)
        .await?;
    Ok(Json(ApiResponse::new(QuestionDto::from(question))))
}

/// Run code on the execution engine and share the result with the room
pub async fn execute_code(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExecuteCodeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    tracing::info!(
        "Execute code: room_id={:?}, user_id={:?}, language={}",
        request.room_id,
        request.user_id,
        request.language
    );

    let room_id = non_empty(request.room_id).map(RoomId::new).transpose()?;
    let user_id = non_empty(request.user_id).map(ClientId::new).transpose()?;
    let submission = CodeSubmission::new(&request.language, request.code, request.stdin);

    let result = state
        .execute_code_usecase
        .execute(ExecutionRequest {
            room_id,
            user_id,
            submission,
        })
        .await?;
    Ok(Json(ApiResponse::new(result)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//! Mapping from usecase errors to HTTP responses.
//!
//! Every failure is answered with `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    domain::{CodeExecutionError, QuestionLookupError, RegistryError, ValueObjectError},
    infrastructure::dto::http::ErrorResponse,
    usecase::{
        ConnectError, CreateRoomError, ExecuteCodeError, GetRoomDetailError, SearchQuestionError,
    },
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    GatewayTimeout(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("{} {}", status, self);
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ValueObjectError> for ApiError {
    fn from(e: ValueObjectError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::CapacityExceeded(_) => ApiError::Unavailable(e.to_string()),
            RegistryError::AlreadyExists(_) => ApiError::Conflict(e.to_string()),
        }
    }
}

impl From<ConnectError> for ApiError {
    fn from(e: ConnectError) -> Self {
        match e {
            ConnectError::Registry(e) => e.into(),
            ConnectError::RoomClosed(_) => ApiError::Unavailable(e.to_string()),
        }
    }
}

impl From<CreateRoomError> for ApiError {
    fn from(e: CreateRoomError) -> Self {
        match e {
            CreateRoomError::Registry(e) => e.into(),
            CreateRoomError::IdGeneration(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<GetRoomDetailError> for ApiError {
    fn from(e: GetRoomDetailError) -> Self {
        ApiError::NotFound(e.to_string())
    }
}

impl From<SearchQuestionError> for ApiError {
    fn from(e: SearchQuestionError) -> Self {
        match e {
            SearchQuestionError::EmptyKeyword => ApiError::BadRequest(e.to_string()),
            SearchQuestionError::Lookup(QuestionLookupError::NotFound(_)) => {
                ApiError::NotFound(e.to_string())
            }
            SearchQuestionError::Lookup(QuestionLookupError::Timeout) => {
                ApiError::GatewayTimeout(e.to_string())
            }
            SearchQuestionError::Lookup(QuestionLookupError::Upstream(_)) => {
                ApiError::BadGateway(e.to_string())
            }
        }
    }
}

impl From<ExecuteCodeError> for ApiError {
    fn from(e: ExecuteCodeError) -> Self {
        match e {
            ExecuteCodeError::EmptyLanguage => ApiError::BadRequest(e.to_string()),
            ExecuteCodeError::Execution(CodeExecutionError::Timeout) => {
                ApiError::GatewayTimeout(e.to_string())
            }
            ExecuteCodeError::Execution(_) => ApiError::BadGateway(e.to_string()),
        }
    }
}

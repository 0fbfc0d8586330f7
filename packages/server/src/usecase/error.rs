//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::{CodeExecutionError, QuestionLookupError, RegistryError, ValueObjectError};

/// 参加者接続時のエラー
#[derive(Debug, Error, PartialEq)]
pub enum ConnectError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("room '{0}' is shutting down")]
    RoomClosed(String),
}

/// ルーム作成時のエラー
#[derive(Debug, Error, PartialEq)]
pub enum CreateRoomError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("failed to generate room id: {0}")]
    IdGeneration(#[from] ValueObjectError),
}

#[derive(Debug, Error, PartialEq)]
pub enum GetRoomDetailError {
    #[error("room '{0}' not found")]
    NotFound(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum SearchQuestionError {
    #[error("keyword is required")]
    EmptyKeyword,

    #[error(transparent)]
    Lookup(#[from] QuestionLookupError),
}

#[derive(Debug, Error, PartialEq)]
pub enum ExecuteCodeError {
    #[error("language is required")]
    EmptyLanguage,

    #[error(transparent)]
    Execution(#[from] CodeExecutionError),
}

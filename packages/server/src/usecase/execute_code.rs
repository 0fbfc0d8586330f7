//! UseCase: コードの実行
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ExecuteCodeUseCase::execute() メソッド
//! - 実行エンジンへの転送と、実行結果のルームへの配信
//!
//! ### なぜこのテストが必要か
//! - 実行結果が呼び出し元に返ることを保証
//! - room_id が生きているルームを指す場合、結果が execution_output として
//!   ルーム全員に届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルーム指定あり／なし
//! - 異常系：タイムアウト（配信されない）、言語未指定

use std::sync::Arc;

use crate::domain::{
    ClientId, CodeExecutor, CodeSubmission, EventPayload, RoomId, RoomRepository,
};

use super::error::ExecuteCodeError;

#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Room to share the result with, if any
    pub room_id: Option<RoomId>,
    /// Client the result is attributed to
    pub user_id: Option<ClientId>,
    pub submission: CodeSubmission,
}

pub struct ExecuteCodeUseCase {
    executor: Arc<dyn CodeExecutor>,
    repository: Arc<dyn RoomRepository>,
}

impl ExecuteCodeUseCase {
    pub fn new(executor: Arc<dyn CodeExecutor>, repository: Arc<dyn RoomRepository>) -> Self {
        Self {
            executor,
            repository,
        }
    }

    pub async fn execute(
        &self,
        request: ExecutionRequest,
    ) -> Result<serde_json::Value, ExecuteCodeError> {
        if request.submission.language.is_empty() {
            return Err(ExecuteCodeError::EmptyLanguage);
        }

        let result = self.executor.execute(&request.submission).await?;

        if let Some(room_id) = &request.room_id {
            match self.repository.get(room_id).await {
                Some(room) => {
                    tracing::info!("Broadcasting execution output to room '{}'", room_id);
                    let payload = EventPayload::ExecutionOutput {
                        result: result.clone(),
                    };
                    if room.announce(request.user_id, payload).await.is_err() {
                        tracing::warn!("Room '{}' stopped before execution output", room_id);
                    }
                }
                None => tracing::debug!("No live room '{}' for execution output", room_id),
            }
        }

        Ok(result)
    }
}

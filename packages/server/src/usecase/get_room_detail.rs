//! UseCase: ルーム詳細の取得
//!
//! 入室可否（満室かどうか）の事前確認に使う読み取り専用の問い合わせ。
//! 実際の入室判定はルームのイベントループが行う。

use std::sync::Arc;

use crate::domain::{RoomHandle, RoomId, RoomRepository};

use super::error::GetRoomDetailError;

pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(
        &self,
        room_id: &RoomId,
    ) -> Result<Arc<dyn RoomHandle>, GetRoomDetailError> {
        self.repository
            .get(room_id)
            .await
            .ok_or_else(|| GetRoomDetailError::NotFound(room_id.to_string()))
    }
}

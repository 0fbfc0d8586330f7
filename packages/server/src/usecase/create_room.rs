//! UseCase: ルーム作成
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//!
//! ### どのような状況を想定しているか
//! - 正常系：ID 指定なし（UUID を採番）、ID 指定あり
//! - 異常系：既存の ID、レジストリ満杯

use std::sync::Arc;

use crate::domain::{RoomId, RoomIdFactory, RoomRepository};

use super::error::CreateRoomError;

pub struct CreateRoomUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl CreateRoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// ルームを作成し、その ID を返す。`room_id` が `None` なら採番する。
    pub async fn execute(&self, room_id: Option<RoomId>) -> Result<RoomId, CreateRoomError> {
        let room_id = match room_id {
            Some(id) => id,
            None => RoomIdFactory::generate()?,
        };
        let room = self.repository.create(room_id).await?;
        Ok(room.id().clone())
    }
}

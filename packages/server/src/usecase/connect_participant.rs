//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::resolve_room() / execute() メソッド
//! - ルームの解決（なければ作成）と、ルームのイベントループへの入室依頼
//!
//! ### なぜこのテストが必要か
//! - 同じ room_id に接続したクライアントが同じルームに入ることを保証
//! - レジストリ満杯時に接続が拒否されることを確認
//! - 入室後、最初に sync が届くことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規ルームへの接続、既存ルームへの接続
//! - 異常系：レジストリ満杯、停止済みルームへの入室依頼

use std::sync::Arc;

use crate::domain::{ClientId, PusherChannel, RoomHandle, RoomId, RoomRepository};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// Repository（ルームレジストリの抽象化）
    repository: Arc<dyn RoomRepository>,
}

impl ConnectParticipantUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 接続先のルームを取得する。存在しなければ作成する。
    ///
    /// WebSocket のアップグレード前に呼ばれるため、レジストリが満杯の場合は
    /// HTTP エラーとして返せる。
    pub async fn resolve_room(
        &self,
        room_id: RoomId,
    ) -> Result<Arc<dyn RoomHandle>, ConnectError> {
        Ok(self.repository.resolve_or_create(room_id).await?)
    }

    /// ルームに入室を依頼する
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 依頼がイベントループに受け付けられた（満室の場合はエラー
    ///   イベントが `outbox` に届き、キューが閉じられる）
    /// * `Err(ConnectError::RoomClosed)` - ルームのイベントループが停止済み
    pub async fn execute(
        &self,
        room: &Arc<dyn RoomHandle>,
        client_id: ClientId,
        outbox: PusherChannel,
    ) -> Result<(), ConnectError> {
        room.admit(client_id, outbox)
            .await
            .map_err(|_| ConnectError::RoomClosed(room.id().to_string()))
    }
}

//! UseCase: 参加者切断処理

use std::sync::Arc;

use crate::domain::{ClientId, RoomHandle};

/// 参加者切断のユースケース
///
/// 受信・送信どちらのタスクが先に終了しても、接続ごとにちょうど一度呼ばれる。
/// 退室イベント（leave）の送出はルームのイベントループが行う。
#[derive(Default)]
pub struct DisconnectParticipantUseCase;

impl DisconnectParticipantUseCase {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, room: &Arc<dyn RoomHandle>, client_id: ClientId) {
        if room.dismiss(client_id.clone()).await.is_err() {
            // the loop is gone, so there is nobody left to notify
            tracing::debug!(
                "Room '{}' already stopped when '{}' disconnected",
                room.id(),
                client_id
            );
        }
    }
}

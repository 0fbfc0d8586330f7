//! UseCase: クライアントから届いたイベントの中継
//!
//! 受信タスクがデコードしたイベントをルームのイベントループに渡す。
//! 配信先の決定と状態の更新はイベントループ側で行う。

use std::sync::Arc;

use crate::domain::{ClientId, EventPayload, RoomHandle};

#[derive(Default)]
pub struct RelayEventUseCase;

impl RelayEventUseCase {
    pub fn new() -> Self {
        Self
    }

    /// Returns `false` when the room has stopped and the connection should end.
    pub async fn execute(
        &self,
        room: &Arc<dyn RoomHandle>,
        from: ClientId,
        payload: EventPayload,
    ) -> bool {
        if matches!(payload, EventPayload::Error { .. }) {
            tracing::debug!("Dropping client-sent error event from '{}'", from);
            return true;
        }
        room.publish(from, payload).await.is_ok()
    }
}

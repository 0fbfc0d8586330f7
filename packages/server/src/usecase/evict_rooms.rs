//! UseCase: 古い空きルームの掃除
//!
//! サーバー起動中、一定間隔でバックグラウンドタスクから呼ばれる。

use std::sync::Arc;

use crate::domain::{RoomId, RoomRepository};

pub struct EvictRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl EvictRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> Vec<RoomId> {
        let evicted = self.repository.evict_stale().await;
        if !evicted.is_empty() {
            tracing::info!("Evicted {} stale room(s)", evicted.len());
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::HubConfig, infrastructure::repository::InMemoryRoomRepository};
    use duocode_shared::time::ManualClock;
    use std::time::Duration;

    #[tokio::test]
    async fn test_only_stale_rooms_are_evicted() {
        // テスト項目: 閾値を超えた空きルームだけが削除される
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(0));
        let config = HubConfig {
            stale_after: Duration::from_secs(60),
            ..HubConfig::default()
        };
        let repository = Arc::new(InMemoryRoomRepository::new(config, clock.clone()));
        repository
            .create(RoomId::new("old".to_string()).unwrap())
            .await
            .unwrap();
        clock.advance(30_000);
        repository
            .create(RoomId::new("new".to_string()).unwrap())
            .await
            .unwrap();
        clock.advance(30_000);
        let usecase = EvictRoomsUseCase::new(repository.clone());

        // when (操作):
        let evicted = usecase.execute().await;

        // then (期待する結果):
        assert_eq!(evicted, vec![RoomId::new("old".to_string()).unwrap()]);
        assert_eq!(repository.count().await, 1);
    }
}

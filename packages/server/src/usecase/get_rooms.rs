//! UseCase: ルーム一覧の取得

use std::sync::Arc;

use crate::domain::{RoomHandle, RoomRepository};

pub struct GetRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 作成順に並んだルーム一覧
    pub async fn execute(&self) -> Vec<Arc<dyn RoomHandle>> {
        self.repository.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::HubConfig, domain::RoomId, infrastructure::repository::InMemoryRoomRepository};
    use duocode_shared::time::ManualClock;

    #[tokio::test]
    async fn test_rooms_are_listed_in_creation_order() {
        // テスト項目: ルームが作成順に返される
        // given (前提条件):
        let clock = Arc::new(ManualClock::new(1_000));
        let repository = Arc::new(InMemoryRoomRepository::new(
            HubConfig::default(),
            clock.clone(),
        ));
        for id in ["zeta", "alpha"] {
            repository
                .create(RoomId::new(id.to_string()).unwrap())
                .await
                .unwrap();
            clock.advance(10);
        }
        let usecase = GetRoomsUseCase::new(repository);

        // when (操作):
        let rooms = usecase.execute().await;

        // then (期待する結果):
        let ids: Vec<&str> = rooms.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha"]);
    }
}

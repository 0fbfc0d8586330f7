//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap でルーム ID からルームのイベントループへのハンドルを引く。
//!
//! レジストリ自体はセッション状態を持たない。状態はすべて各ルームの
//! イベントループが所有する。排他ロックはマップの更新中だけ保持し、
//! ルームへのコマンド送信をまたいで保持することはない。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use duocode_shared::time::Clock;
use tokio::sync::RwLock;

use crate::{
    config::HubConfig,
    domain::{RegistryError, RoomHandle, RoomId, RoomRepository, Timestamp},
    infrastructure::hub::RoomLoopHandle,
};

pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<RoomId, Arc<RoomLoopHandle>>>,
    config: HubConfig,
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomRepository {
    pub fn new(config: HubConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            config,
            clock,
        }
    }

    /// Insert a new room, sweeping stale rooms first if the registry is full.
    ///
    /// Must be called with the write lock held.
    fn insert_room(
        &self,
        rooms: &mut HashMap<RoomId, Arc<RoomLoopHandle>>,
        room_id: RoomId,
    ) -> Result<Arc<RoomLoopHandle>, RegistryError> {
        if rooms.len() >= self.config.max_rooms {
            let evicted = self.sweep(rooms);
            tracing::info!(
                "Registry at capacity; evicted {} stale room(s)",
                evicted.len()
            );
            if rooms.len() >= self.config.max_rooms {
                return Err(RegistryError::CapacityExceeded(self.config.max_rooms));
            }
        }

        let handle = RoomLoopHandle::spawn(room_id.clone(), &self.config, self.clock.clone());
        rooms.insert(room_id.clone(), handle.clone());
        tracing::info!("Room '{}' created ({} room(s))", room_id, rooms.len());
        Ok(handle)
    }

    /// Drop every room that is empty and older than the staleness window.
    ///
    /// A room whose handle is still held outside the registry is kept: a
    /// connection resolved it and its admission may still be queued.
    fn sweep(&self, rooms: &mut HashMap<RoomId, Arc<RoomLoopHandle>>) -> Vec<RoomId> {
        let now = Timestamp::new(self.clock.now_millis());
        let stale_after = self.config.stale_after.as_millis() as i64;

        let stale: Vec<RoomId> = rooms
            .iter()
            .filter(|(_, room)| {
                Arc::strong_count(room) == 1
                    && room.member_count() == 0
                    && room.created_at().elapsed_millis(now) >= stale_after
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &stale {
            rooms.remove(id);
            tracing::info!("Room '{}' evicted", id);
        }
        stale
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn resolve_or_create(
        &self,
        room_id: RoomId,
    ) -> Result<Arc<dyn RoomHandle>, RegistryError> {
        let mut rooms = self.rooms.write().await;
        if let Some(room) = rooms.get(&room_id) {
            return Ok(room.clone() as Arc<dyn RoomHandle>);
        }
        let room = self.insert_room(&mut rooms, room_id)?;
        Ok(room as Arc<dyn RoomHandle>)
    }

    async fn create(&self, room_id: RoomId) -> Result<Arc<dyn RoomHandle>, RegistryError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&room_id) {
            return Err(RegistryError::AlreadyExists(room_id.into_string()));
        }
        let room = self.insert_room(&mut rooms, room_id)?;
        Ok(room as Arc<dyn RoomHandle>)
    }

    async fn get(&self, room_id: &RoomId) -> Option<Arc<dyn RoomHandle>> {
        let rooms = self.rooms.read().await;
        rooms
            .get(room_id)
            .map(|room| room.clone() as Arc<dyn RoomHandle>)
    }

    async fn list(&self) -> Vec<Arc<dyn RoomHandle>> {
        let rooms = self.rooms.read().await;
        let mut handles: Vec<Arc<RoomLoopHandle>> = rooms.values().cloned().collect();
        handles.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        handles
            .into_iter()
            .map(|room| room as Arc<dyn RoomHandle>)
            .collect()
    }

    async fn evict_stale(&self) -> Vec<RoomId> {
        let mut rooms = self.rooms.write().await;
        self.sweep(&mut rooms)
    }

    async fn count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClientId;
    use duocode_shared::time::ManualClock;
    use std::time::Duration;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - resolve_or_create / create / get / list の基本動作
    // - ルーム数上限と、上限到達時の掃除
    // - 空ルームの猶予期間（staleness window）
    //
    // 【なぜこのテストが必要か】
    // - レジストリはすべての接続が共有するプロセス全体の索引
    // - 使用中のルームが消えないこと、古い空ルームだけが消えることを保証する
    // ========================================

    const STALE: Duration = Duration::from_secs(60);

    fn create_test_repository(max_rooms: usize) -> (InMemoryRoomRepository, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let config = HubConfig {
            max_rooms,
            stale_after: STALE,
            ..HubConfig::default()
        };
        (InMemoryRoomRepository::new(config, clock.clone()), clock)
    }

    fn room_id(raw: &str) -> RoomId {
        RoomId::new(raw.to_string()).unwrap()
    }

    async fn occupy(
        room: &Arc<dyn RoomHandle>,
        name: &str,
    ) -> mpsc::Receiver<crate::domain::Outbound> {
        let (tx, mut rx) = mpsc::channel(8);
        room.admit(ClientId::new(name.to_string()).unwrap(), tx)
            .await
            .unwrap();
        // wait for the sync event so the roster is published
        rx.recv().await.unwrap();
        rx
    }

    #[tokio::test]
    async fn test_resolve_or_create_returns_same_room() {
        // テスト項目: 同じ ID で解決すると同じルームが返される
        // given (前提条件):
        let (repo, _clock) = create_test_repository(10);

        // when (操作):
        let first = repo.resolve_or_create(room_id("R1")).await.unwrap();
        let second = repo.resolve_or_create(room_id("R1")).await.unwrap();

        // then (期待する結果):
        assert_eq!(first.id(), second.id());
        assert_eq!(first.created_at(), second.created_at());
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_existing_id() {
        // テスト項目: 既存の ID でルームを作成するとエラーになる
        // given (前提条件):
        let (repo, _clock) = create_test_repository(10);
        repo.create(room_id("R1")).await.unwrap();

        // when (操作):
        let result = repo.create(room_id("R1")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RegistryError::AlreadyExists(id)) if id == "R1"));
    }

    #[tokio::test]
    async fn test_get_unknown_room_returns_none() {
        // テスト項目: 存在しないルームの取得は None
        // given (前提条件):
        let (repo, _clock) = create_test_repository(10);

        // when (操作):
        let result = repo.get(&room_id("missing")).await;

        // then (期待する結果):
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_empty_room_survives_until_stale() {
        // テスト項目: 空ルームは猶予期間内は残り、経過後に削除される
        // given (前提条件):
        let (repo, clock) = create_test_repository(10);
        repo.create(room_id("R1")).await.unwrap();

        // when (操作): 猶予期間内の掃除
        clock.advance(STALE.as_millis() as i64 - 1);
        let early = repo.evict_stale().await;

        // then (期待する結果):
        assert!(early.is_empty());
        assert!(repo.get(&room_id("R1")).await.is_some());

        // when (操作): 猶予期間経過後の掃除
        clock.advance(1);
        let late = repo.evict_stale().await;

        // then (期待する結果):
        assert_eq!(late, vec![room_id("R1")]);
        assert!(repo.get(&room_id("R1")).await.is_none());
    }

    #[tokio::test]
    async fn test_occupied_room_is_never_evicted() {
        // テスト項目: 参加者がいるルームは古くても削除されない
        // given (前提条件):
        let (repo, clock) = create_test_repository(10);
        let room = repo.create(room_id("R1")).await.unwrap();
        let _alice = occupy(&room, "alice").await;

        // when (操作):
        clock.advance(STALE.as_millis() as i64 * 10);
        let evicted = repo.evict_stale().await;

        // then (期待する結果):
        assert!(evicted.is_empty());
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_resolved_room_is_not_evicted_before_admission() {
        // テスト項目: 接続が解決済みでまだ参加していないルームは古くても削除されない
        // given (前提条件):
        let (repo, clock) = create_test_repository(10);
        let pending = repo.resolve_or_create(room_id("R1")).await.unwrap();
        clock.advance(STALE.as_millis() as i64 * 10);

        // when (操作):
        let evicted = repo.evict_stale().await;

        // then (期待する結果):
        assert!(evicted.is_empty());
        let again = repo.resolve_or_create(room_id("R1")).await.unwrap();
        assert!(Arc::ptr_eq(&pending, &again));

        // when (操作): 接続がハンドルを手放した後の掃除
        drop(pending);
        drop(again);
        let evicted = repo.evict_stale().await;

        // then (期待する結果):
        assert_eq!(evicted, vec![room_id("R1")]);
    }

    #[tokio::test]
    async fn test_capacity_triggers_sweep_before_insert() {
        // テスト項目: 上限到達時は古い空ルームを掃除してから作成する
        // given (前提条件):
        let (repo, clock) = create_test_repository(2);
        repo.create(room_id("old")).await.unwrap();
        let busy = repo.create(room_id("busy")).await.unwrap();
        let _alice = occupy(&busy, "alice").await;
        clock.advance(STALE.as_millis() as i64);

        // when (操作):
        let result = repo.resolve_or_create(room_id("new")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(repo.get(&room_id("old")).await.is_none());
        assert!(repo.get(&room_id("busy")).await.is_some());
        assert_eq!(repo.count().await, 2);
    }

    #[tokio::test]
    async fn test_capacity_exceeded_when_nothing_is_stale() {
        // テスト項目: 掃除しても空きがなければエラーになる
        // given (前提条件):
        let (repo, _clock) = create_test_repository(1);
        repo.create(room_id("fresh")).await.unwrap();

        // when (操作):
        let result = repo.resolve_or_create(room_id("another")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(RegistryError::CapacityExceeded(1))));
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_creation() {
        // テスト項目: 一覧は作成順に並ぶ
        // given (前提条件):
        let (repo, clock) = create_test_repository(10);
        repo.create(room_id("b")).await.unwrap();
        clock.advance(10);
        repo.create(room_id("a")).await.unwrap();

        // when (操作):
        let rooms = repo.list().await;

        // then (期待する結果):
        let ids: Vec<&str> = rooms.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}

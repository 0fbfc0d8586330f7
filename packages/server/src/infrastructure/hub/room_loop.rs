use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

use async_trait::async_trait;
use duocode_shared::time::Clock;
use tokio::{
    sync::mpsc::{self, error::TrySendError},
    time::MissedTickBehavior,
};

use crate::{
    config::HubConfig,
    domain::{
        ClientId, Delivery, EventPayload, Member, Outbound, PusherChannel, Room, RoomClosedError,
        RoomError, RoomHandle, RoomId, Timestamp,
    },
};

enum RoomCommand {
    Admit {
        client_id: ClientId,
        outbox: PusherChannel,
    },
    Dismiss {
        client_id: ClientId,
    },
    Publish {
        from: ClientId,
        payload: EventPayload,
    },
    Announce {
        attributed_to: Option<ClientId>,
        payload: EventPayload,
    },
}

type Roster = Arc<RwLock<Vec<Member>>>;

/// Cloneable handle to a running room event loop.
///
/// The loop stops once every handle has been dropped.
pub struct RoomLoopHandle {
    id: RoomId,
    created_at: Timestamp,
    commands: mpsc::Sender<RoomCommand>,
    roster: Roster,
}

impl RoomLoopHandle {
    /// Start the event loop for a new, empty room.
    pub fn spawn(
        room_id: RoomId,
        config: &HubConfig,
        clock: Arc<dyn Clock>,
    ) -> Arc<RoomLoopHandle> {
        let created_at = Timestamp::new(clock.now_millis());
        let (commands, receiver) = mpsc::channel(config.room_queue_capacity);
        let roster: Roster = Arc::new(RwLock::new(Vec::new()));

        let room_loop = RoomLoop {
            room: Room::new(room_id.clone(), created_at),
            outboxes: HashMap::new(),
            roster: roster.clone(),
            clock,
        };
        tokio::spawn(room_loop.run(receiver, config.ping_interval));

        Arc::new(RoomLoopHandle {
            id: room_id,
            created_at,
            commands,
            roster,
        })
    }

    async fn send(&self, command: RoomCommand) -> Result<(), RoomClosedError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| RoomClosedError)
    }
}

#[async_trait]
impl RoomHandle for RoomLoopHandle {
    fn id(&self) -> &RoomId {
        &self.id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    async fn admit(
        &self,
        client_id: ClientId,
        outbox: PusherChannel,
    ) -> Result<(), RoomClosedError> {
        self.send(RoomCommand::Admit { client_id, outbox }).await
    }

    async fn dismiss(&self, client_id: ClientId) -> Result<(), RoomClosedError> {
        self.send(RoomCommand::Dismiss { client_id }).await
    }

    async fn publish(&self, from: ClientId, payload: EventPayload) -> Result<(), RoomClosedError> {
        self.send(RoomCommand::Publish { from, payload }).await
    }

    async fn announce(
        &self,
        attributed_to: Option<ClientId>,
        payload: EventPayload,
    ) -> Result<(), RoomClosedError> {
        self.send(RoomCommand::Announce {
            attributed_to,
            payload,
        })
        .await
    }

    fn members(&self) -> Vec<Member> {
        self.roster
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn member_count(&self) -> usize {
        self.roster
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// State owned exclusively by the room task
struct RoomLoop {
    room: Room,
    outboxes: HashMap<ClientId, PusherChannel>,
    roster: Roster,
    clock: Arc<dyn Clock>,
}

impl RoomLoop {
    async fn run(mut self, mut commands: mpsc::Receiver<RoomCommand>, ping_interval: Duration) {
        tracing::info!("Room '{}' event loop started", self.room.id);

        let mut ticker = tokio::time::interval(ping_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                _ = ticker.tick() => self.probe_members(),
            }
        }

        // Closing every remaining queue shuts the connections down.
        self.outboxes.clear();
        tracing::info!("Room '{}' event loop stopped", self.room.id);
    }

    fn handle(&mut self, command: RoomCommand) {
        match command {
            RoomCommand::Admit { client_id, outbox } => self.admit(client_id, outbox),
            RoomCommand::Dismiss { client_id } => self.evict(&client_id),
            RoomCommand::Publish { from, payload } => {
                match self.room.ingest(&from, payload) {
                    Some(delivery) => self.deliver(delivery),
                    None => tracing::debug!(
                        "Dropped event from '{}' in room '{}'",
                        from,
                        self.room.id
                    ),
                }
            }
            RoomCommand::Announce {
                attributed_to,
                payload,
            } => {
                if let Some(delivery) = self.room.announce(attributed_to, payload) {
                    self.deliver(delivery);
                }
            }
        }
    }

    fn admit(&mut self, client_id: ClientId, outbox: PusherChannel) {
        let joined_at = Timestamp::new(self.clock.now_millis());
        match self.room.admit(client_id.clone(), joined_at) {
            Ok(admission) => {
                tracing::info!(
                    "Client '{}' joined room '{}' as {} ({}/{})",
                    client_id,
                    self.room.id,
                    admission.member.role,
                    self.room.len(),
                    crate::domain::ROOM_CAPACITY
                );
                self.outboxes.insert(client_id, outbox);
                self.publish_roster();
                self.deliver(admission.sync);
                self.deliver(admission.join);
            }
            Err(RoomError::Full) => {
                tracing::warn!(
                    "Room '{}' is full. Rejecting client '{}'",
                    self.room.id,
                    client_id
                );
                let rejection = Arc::new(self.room.rejection());
                if outbox.try_send(Outbound::Event(rejection)).is_err() {
                    tracing::debug!("Client '{}' went away before rejection", client_id);
                }
                // `outbox` is dropped here, closing the candidate's queue.
            }
            Err(RoomError::AlreadyMember(id)) => {
                tracing::debug!("Client '{}' is already in room '{}'", id, self.room.id);
            }
        }
    }

    /// Remove a member, close its queue and announce the departure.
    fn evict(&mut self, client_id: &ClientId) {
        self.outboxes.remove(client_id);
        if let Some(leave) = self.room.dismiss(client_id) {
            tracing::info!(
                "Client '{}' left room '{}' ({}/{})",
                client_id,
                self.room.id,
                self.room.len(),
                crate::domain::ROOM_CAPACITY
            );
            self.publish_roster();
            self.deliver(leave);
        }
    }

    /// Push an event to each recipient without ever waiting.
    ///
    /// A recipient whose queue is full or closed is treated as dead and
    /// evicted on the spot.
    fn deliver(&mut self, delivery: Delivery) {
        let mut dead = Vec::new();
        for recipient in &delivery.recipients {
            let Some(outbox) = self.outboxes.get(recipient) else {
                continue;
            };
            match outbox.try_send(Outbound::Event(delivery.event.clone())) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        "Outbound queue of '{}' is full. Evicting from room '{}'",
                        recipient,
                        self.room.id
                    );
                    dead.push(recipient.clone());
                }
                Err(TrySendError::Closed(_)) => dead.push(recipient.clone()),
            }
        }
        for client_id in dead {
            self.evict(&client_id);
        }
    }

    fn probe_members(&mut self) {
        let dead: Vec<ClientId> = self
            .outboxes
            .iter()
            .filter(|(_, outbox)| outbox.try_send(Outbound::Probe).is_err())
            .map(|(client_id, _)| client_id.clone())
            .collect();
        for client_id in dead {
            tracing::info!(
                "Liveness probe to '{}' failed. Evicting from room '{}'",
                client_id,
                self.room.id
            );
            self.evict(&client_id);
        }
    }

    fn publish_roster(&self) {
        let mut roster = self
            .roster
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *roster = self.room.members().to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProblemFields, Role, SignalKind};
    use duocode_shared::time::FixedClock;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(1);

    fn spawn_room(config: &HubConfig) -> Arc<RoomLoopHandle> {
        RoomLoopHandle::spawn(
            RoomId::new("R1".to_string()).unwrap(),
            config,
            Arc::new(FixedClock::new(1_000)),
        )
    }

    fn client(name: &str) -> ClientId {
        ClientId::new(name.to_string()).unwrap()
    }

    async fn next_event(rx: &mut mpsc::Receiver<Outbound>) -> Arc<crate::domain::RoomEvent> {
        loop {
            match timeout(WAIT, rx.recv()).await {
                Ok(Some(Outbound::Event(event))) => return event,
                Ok(Some(Outbound::Probe)) => continue,
                Ok(None) => panic!("queue closed"),
                Err(_) => panic!("timed out waiting for event"),
            }
        }
    }

    async fn join(
        room: &RoomLoopHandle,
        name: &str,
        capacity: usize,
    ) -> mpsc::Receiver<Outbound> {
        let (tx, rx) = mpsc::channel(capacity);
        room.admit(client(name), tx).await.unwrap();
        rx
    }

    /// Round-trip through the loop so earlier commands are processed.
    async fn settle(room: &RoomLoopHandle) {
        room.dismiss(client("nobody")).await.unwrap();
        tokio::task::yield_now().await;
        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_admit_sends_sync_then_join() {
        // テスト項目: 参加時に sync と join がこの順で届く
        // given (前提条件):
        let room = spawn_room(&HubConfig::default());

        // when (操作):
        let mut alice = join(&room, "alice", 8).await;

        // then (期待する結果):
        let sync = next_event(&mut alice).await;
        assert!(matches!(sync.payload, EventPayload::Sync { .. }));
        assert_eq!(sync.role, Some(Role::Author));
        let joined = next_event(&mut alice).await;
        assert!(matches!(joined.payload, EventPayload::Join { .. }));
        settle(&room).await;
        assert_eq!(room.member_count(), 1);
    }

    #[tokio::test]
    async fn test_third_client_gets_one_error_and_closed_queue() {
        // テスト項目: 満員のルームへの3人目はエラーを1件受け取り、キューが閉じられる
        // given (前提条件):
        let room = spawn_room(&HubConfig::default());
        let _alice = join(&room, "alice", 8).await;
        let _bob = join(&room, "bob", 8).await;

        // when (操作):
        let mut charlie = join(&room, "charlie", 8).await;

        // then (期待する結果):
        let error = next_event(&mut charlie).await;
        assert_eq!(
            error.payload,
            EventPayload::Error {
                message: "Room is full".to_string()
            }
        );
        assert!(timeout(WAIT, charlie.recv()).await.unwrap().is_none());
        settle(&room).await;
        assert_eq!(room.member_count(), 2);
    }

    #[tokio::test]
    async fn test_code_is_not_echoed_to_sender() {
        // テスト項目: code は相手にだけ届き、送信者には返らない
        // given (前提条件):
        let room = spawn_room(&HubConfig::default());
        let mut alice = join(&room, "alice", 8).await;
        let mut bob = join(&room, "bob", 8).await;
        next_event(&mut alice).await; // sync
        next_event(&mut alice).await; // join (alice)
        next_event(&mut alice).await; // join (bob)
        next_event(&mut bob).await; // sync
        next_event(&mut bob).await; // join (bob)

        // when (操作):
        room.publish(
            client("alice"),
            EventPayload::Code {
                content: "x=1".to_string(),
                problem: ProblemFields::default(),
            },
        )
        .await
        .unwrap();
        room.publish(
            client("alice"),
            EventPayload::Chat {
                content: "done".to_string(),
            },
        )
        .await
        .unwrap();

        // then (期待する結果):
        let received = next_event(&mut bob).await;
        assert_eq!(
            received.payload,
            EventPayload::Code {
                content: "x=1".to_string(),
                problem: ProblemFields::default()
            }
        );
        assert_eq!(received.sender, Some(client("alice")));
        // alice's next event is her own chat echo, not the code
        let echoed = next_event(&mut alice).await;
        assert!(matches!(echoed.payload, EventPayload::Chat { .. }));
    }

    #[tokio::test]
    async fn test_dismiss_announces_leave_once() {
        // テスト項目: 退出は残りのメンバーに leave を1回だけ通知する
        // given (前提条件):
        let room = spawn_room(&HubConfig::default());
        let _alice = join(&room, "alice", 8).await;
        let mut bob = join(&room, "bob", 8).await;
        next_event(&mut bob).await; // sync
        next_event(&mut bob).await; // join

        // when (操作):
        room.dismiss(client("alice")).await.unwrap();
        room.dismiss(client("alice")).await.unwrap();
        room.publish(
            client("bob"),
            EventPayload::Chat {
                content: "still here".to_string(),
            },
        )
        .await
        .unwrap();

        // then (期待する結果):
        let leave = next_event(&mut bob).await;
        assert!(matches!(leave.payload, EventPayload::Leave { .. }));
        assert_eq!(leave.sender, Some(client("alice")));
        assert_eq!(leave.role, Some(Role::Author));
        let next = next_event(&mut bob).await;
        assert!(matches!(next.payload, EventPayload::Chat { .. }));
        assert_eq!(room.member_count(), 1);
    }

    #[tokio::test]
    async fn test_full_queue_evicts_member() {
        // テスト項目: 送信キューが満杯のメンバーは退出扱いになる
        // given (前提条件):
        let room = spawn_room(&HubConfig::default());
        // capacity 2: sync + join fill alice's queue
        let _alice = join(&room, "alice", 2).await;
        let mut bob = join(&room, "bob", 8).await;
        next_event(&mut bob).await; // sync
        next_event(&mut bob).await; // join

        // when (操作): bob's join cannot be delivered to alice
        let leave = next_event(&mut bob).await;

        // then (期待する結果):
        assert!(matches!(leave.payload, EventPayload::Leave { .. }));
        assert_eq!(leave.sender, Some(client("alice")));
        settle(&room).await;
        assert_eq!(room.member_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_probe_evicts_member() {
        // テスト項目: 生存確認に失敗したメンバーは退出扱いになる
        // given (前提条件):
        let config = HubConfig {
            ping_interval: Duration::from_millis(20),
            ..HubConfig::default()
        };
        let room = spawn_room(&config);
        let alice = join(&room, "alice", 8).await;
        let mut bob = join(&room, "bob", 64).await;
        next_event(&mut bob).await; // sync
        next_event(&mut bob).await; // join

        // when (操作): alice's connection is gone
        drop(alice);

        // then (期待する結果):
        let leave = next_event(&mut bob).await;
        assert!(matches!(leave.payload, EventPayload::Leave { .. }));
        assert_eq!(leave.sender, Some(client("alice")));
        assert_eq!(room.member_count(), 1);
    }

    #[tokio::test]
    async fn test_signal_reaches_only_target() {
        // テスト項目: シグナリングは宛先にだけ届き、宛先不在なら破棄される
        // given (前提条件):
        let room = spawn_room(&HubConfig::default());
        let mut alice = join(&room, "alice", 8).await;
        let mut bob = join(&room, "bob", 8).await;
        for _ in 0..3 {
            next_event(&mut alice).await;
        }
        next_event(&mut bob).await;
        next_event(&mut bob).await;

        // when (操作):
        room.publish(
            client("alice"),
            EventPayload::Signal {
                kind: SignalKind::Offer,
                target: client("ghost"),
                sdp: None,
                ice_candidate: None,
            },
        )
        .await
        .unwrap();
        room.publish(
            client("alice"),
            EventPayload::Signal {
                kind: SignalKind::Offer,
                target: client("bob"),
                sdp: Some(serde_json::json!({"type": "offer"})),
                ice_candidate: None,
            },
        )
        .await
        .unwrap();
        room.publish(
            client("bob"),
            EventPayload::Chat {
                content: "marker".to_string(),
            },
        )
        .await
        .unwrap();

        // then (期待する結果):
        let offer = next_event(&mut bob).await;
        assert!(matches!(
            offer.payload,
            EventPayload::Signal {
                kind: SignalKind::Offer,
                ..
            }
        ));
        // alice sees only the chat marker, never an offer
        let marker = next_event(&mut alice).await;
        assert!(matches!(marker.payload, EventPayload::Chat { .. }));
    }

    #[tokio::test]
    async fn test_loop_stops_when_handles_dropped() {
        // テスト項目: ハンドルがすべて破棄されるとループが止まり、キューが閉じられる
        // given (前提条件):
        let room = spawn_room(&HubConfig::default());
        let mut alice = join(&room, "alice", 8).await;
        next_event(&mut alice).await;
        next_event(&mut alice).await;

        // when (操作):
        drop(room);

        // then (期待する結果):
        assert!(timeout(WAIT, alice.recv()).await.unwrap().is_none());
    }
}

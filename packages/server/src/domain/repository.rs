//! Repository trait 定義
//!
//! ドメイン層が必要とするルームへのアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use std::sync::Arc;

use async_trait::async_trait;

use super::{
    entity::Member,
    error::{RegistryError, RoomClosedError},
    event::{EventPayload, PusherChannel},
    value_object::{ClientId, RoomId, Timestamp},
};

/// Handle to a live room.
///
/// Every method only enqueues a command for the room's event loop; the loop
/// is the single place where membership and session state change.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomHandle: Send + Sync {
    fn id(&self) -> &RoomId;

    fn created_at(&self) -> Timestamp;

    /// Ask the room to admit a client whose outbound queue is `outbox`.
    ///
    /// A full room answers through the queue itself (error event, then the
    /// queue is closed), so `Ok` only means the request was accepted.
    async fn admit(&self, client_id: ClientId, outbox: PusherChannel)
    -> Result<(), RoomClosedError>;

    /// Ask the room to remove a client. No-op for non-members.
    async fn dismiss(&self, client_id: ClientId) -> Result<(), RoomClosedError>;

    /// Hand an event sent by `from` to the room.
    async fn publish(&self, from: ClientId, payload: EventPayload) -> Result<(), RoomClosedError>;

    /// Hand a server-originated event to the room, optionally attributed to
    /// a client.
    async fn announce(
        &self,
        attributed_to: Option<ClientId>,
        payload: EventPayload,
    ) -> Result<(), RoomClosedError>;

    /// Membership snapshot as of the last command the loop processed
    fn members(&self) -> Vec<Member>;

    fn member_count(&self) -> usize {
        self.members().len()
    }
}

/// Process-wide room registry
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Look up a room, creating it (and starting its event loop) if unknown.
    async fn resolve_or_create(&self, room_id: RoomId)
    -> Result<Arc<dyn RoomHandle>, RegistryError>;

    /// Create a room that must not exist yet.
    async fn create(&self, room_id: RoomId) -> Result<Arc<dyn RoomHandle>, RegistryError>;

    async fn get(&self, room_id: &RoomId) -> Option<Arc<dyn RoomHandle>>;

    /// All rooms, ordered by creation time.
    async fn list(&self) -> Vec<Arc<dyn RoomHandle>>;

    /// Remove every empty room older than the staleness window. Returns the
    /// ids of the removed rooms.
    async fn evict_stale(&self) -> Vec<RoomId>;

    async fn count(&self) -> usize;
}

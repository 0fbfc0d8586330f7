//! Identifier factories.

use uuid::Uuid;

use super::{
    error::ValueObjectError,
    value_object::{ClientId, RoomId},
};

/// Generates fresh room identifiers
pub struct RoomIdFactory;

impl RoomIdFactory {
    pub fn generate() -> Result<RoomId, ValueObjectError> {
        RoomId::new(Uuid::new_v4().to_string())
    }
}

/// Generates connection-scoped client identifiers
pub struct ClientIdFactory;

impl ClientIdFactory {
    pub fn generate() -> Result<ClientId, ValueObjectError> {
        ClientId::new(Uuid::new_v4().to_string())
    }
}

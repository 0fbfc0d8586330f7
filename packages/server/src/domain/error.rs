//! Domain error types.

use thiserror::Error;

/// Validation errors raised when constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} is too long ({len} > {max} characters)")]
    TooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("{0} contains control characters")]
    ControlCharacters(&'static str),
}

/// Errors raised by the room state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Room is full")]
    Full,

    #[error("client '{0}' is already a member")]
    AlreadyMember(String),
}

/// Errors raised by the room registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("room registry is at capacity ({0} rooms)")]
    CapacityExceeded(usize),

    #[error("room '{0}' already exists")]
    AlreadyExists(String),
}

/// The room's event loop has stopped and no longer accepts commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("room event loop is closed")]
pub struct RoomClosedError;

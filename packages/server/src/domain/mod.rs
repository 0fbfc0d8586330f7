//! Domain layer: value objects, entities, events, the room state machine and
//! the ports implemented by the infrastructure layer.

pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod repository;
pub mod room;
pub mod service;
pub mod value_object;

pub use entity::{Member, ProblemFields, SessionState};
pub use error::{RegistryError, RoomClosedError, RoomError, ValueObjectError};
pub use event::{EventPayload, Outbound, PusherChannel, RoomEvent, SignalKind};
pub use factory::{ClientIdFactory, RoomIdFactory};
pub use repository::{RoomHandle, RoomRepository};
pub use room::{Admission, Delivery, ROOM_CAPACITY, Room};
pub use service::{
    CodeExecutionError, CodeExecutor, CodeSubmission, Question, QuestionLookup,
    QuestionLookupError,
};
pub use value_object::{ClientId, Role, RoomId, Timestamp};

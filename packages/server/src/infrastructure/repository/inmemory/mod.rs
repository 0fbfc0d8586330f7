//! In-memory registry.

mod room;

pub use room::InMemoryRoomRepository;

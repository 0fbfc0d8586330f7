//! Infrastructure layer: the room event loop, the in-memory registry, wire
//! DTOs and HTTP clients for external collaborators.

pub mod dto;
pub mod executor;
pub mod hub;
pub mod question;
pub mod repository;

//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frame DTO
//! - `http`: HTTP API request/response DTOs
//!
//! `conversion` maps them to and from domain types.

pub mod conversion;
pub mod http;
pub mod websocket;

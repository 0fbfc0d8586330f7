//! Request handlers.

mod error;
mod http;
mod websocket;

pub use http::{
    create_room, execute_code, get_room_detail, get_rooms, health_check, search_question,
};
pub use websocket::websocket_handler;

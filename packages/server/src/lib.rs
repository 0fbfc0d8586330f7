//! Real-time room hub for Duocode, a two-person pair-programming application.
//!
//! Participants connect over WebSocket to a room identified by an opaque id.
//! Each room admits at most two participants, replicates code, language and
//! problem state to late joiners, fans out chat and editor events, and relays
//! WebRTC signaling messages between the two peers.

pub mod config;

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

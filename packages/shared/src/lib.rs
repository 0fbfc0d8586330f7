//! Utilities shared by the Duocode server binary, library and tests.

pub mod logger;
pub mod time;

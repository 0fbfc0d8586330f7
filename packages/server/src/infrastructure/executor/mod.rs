//! Code-execution engine adapters.

mod http;

pub use http::HttpCodeExecutor;

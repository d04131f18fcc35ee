//! HTTP API: server, request/response types, progress log streaming.

pub mod logs;
pub mod server;
pub mod types;

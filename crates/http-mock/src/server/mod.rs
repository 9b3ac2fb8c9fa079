//! HTTP facade for the mock server.
//!
//! Control endpoints (`/_expectation`, `/_request...`, `/_all`, `/_me`,
//! `/_metrics`) act on the stores directly. Every other request is recorded
//! into the request queue and then answered by the matching engine.

mod context;
mod handlers;
mod listener;
mod router;
mod types;

pub use context::ServerContext;
pub use listener::MockServer;

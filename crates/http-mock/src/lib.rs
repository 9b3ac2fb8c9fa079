//! http-mock: an HTTP test double that records every request it receives and
//! replays configured responses for requests matching registered expectations.
//!
//! - [`predicate`] - matcher and limiter kinds
//! - [`expectation`] - expectations, registration and the matching engine
//! - [`state`] - scoped expectation store and request queue over a pluggable backend
//! - [`server`] - hyper listener, control endpoints and the catch-all path

pub mod config;
pub mod error;
pub mod expectation;
pub mod metrics;
pub mod predicate;
pub mod recording;
pub mod server;
pub mod state;

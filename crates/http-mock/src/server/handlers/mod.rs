//! Endpoint handlers.

pub mod catch_all;
pub mod expectations;
pub mod requests;
pub mod system;

//! Expectations and the matching engine.
//!
//! - `types` - [`Expectation`] and [`ResponseSpec`]
//! - `registration` - decoding and validating registration bodies
//! - `engine` - newest-first, first-full-match-wins selection

mod engine;
mod registration;
mod types;

pub use engine::{match_request, select, MatchOutcome};
pub use registration::{parse_registration, register};
pub use types::{Expectation, HeaderPair, ResponseSpec};

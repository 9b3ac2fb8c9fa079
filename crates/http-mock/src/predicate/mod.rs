//! Predicate system for expectation matching.
//!
//! Predicates are data, not code: a closed set of tagged matcher kinds
//! (`method`, `path`, `header`, `query`, `form`, `body`, `custom`) and limiter
//! kinds (`maxRuns`, `custom`). Each wire spec is validated and compiled once
//! (regexes built, expressions parsed) and serializes back to the same spec.
//!
//! # Module Structure
//!
//! - `string_matcher` - string operators (value, contains, startsWith, endsWith, matches, exists)
//! - `request` - request matchers
//! - `limiter` - run-count limiters
//! - `script` - Rhai expressions behind the `custom` kinds

mod limiter;
mod request;
mod script;
mod string_matcher;

pub use limiter::{Limiter, LimiterSpec};
pub use request::{Matcher, MatcherSpec};
pub use script::Expression;
pub use string_matcher::{StringMatch, StringOperator};

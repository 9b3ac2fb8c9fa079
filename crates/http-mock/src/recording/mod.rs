//! Recorded request snapshots.
//!
//! Every request that reaches the catch-all path is normalized into a
//! [`RecordedRequest`] before matching, so the history queue also holds
//! requests that matched nothing.

mod normalize;
mod types;

pub use normalize::{normalize_request, parse_query_string};
pub use types::{ClientMeta, Payload, RecordedRequest};

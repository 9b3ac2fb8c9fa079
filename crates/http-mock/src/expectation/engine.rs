//! Expectation selection for inbound requests.
//!
//! Expectations are tried front to back (newest first). The first one whose
//! matchers all pass and whose limiter (if any) accepts its current run count
//! applies: its `runs` is incremented and its response returned. If none
//! applies, the outcome is `Exhausted` when at least one expectation matched
//! but was turned away by its limiter, and `NoMatch` otherwise.

use super::types::{Expectation, ResponseSpec};
use crate::error::StoreError;
use crate::recording::RecordedRequest;
use crate::state::{ScopeKey, State};
use tracing::debug;

/// Result of running the engine for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// `index` is the expectation's position in evaluation order
    Matched { index: usize, response: ResponseSpec },
    /// An expectation matched but its limiter rejected further use
    Exhausted,
    NoMatch,
}

impl MatchOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            MatchOutcome::Matched { .. } => "matched",
            MatchOutcome::Exhausted => "exhausted",
            MatchOutcome::NoMatch => "no_match",
        }
    }
}

/// Select an expectation for `request`, incrementing the winner's `runs` in place.
pub fn select(expectations: &mut [Expectation], request: &RecordedRequest) -> MatchOutcome {
    let mut gone = false;

    for (index, expectation) in expectations.iter_mut().enumerate() {
        // Short-circuits on the first failing matcher
        if !expectation.matchers.iter().all(|m| m.evaluate(request)) {
            continue;
        }

        if let Some(limiter) = &expectation.limiter {
            if !limiter.allows(expectation.runs) {
                debug!(
                    index,
                    runs = expectation.runs,
                    "Expectation matched but limiter rejected it"
                );
                gone = true;
                continue;
            }
        }

        expectation.runs += 1;
        return MatchOutcome::Matched {
            index,
            response: expectation.response.clone(),
        };
    }

    if gone {
        MatchOutcome::Exhausted
    } else {
        MatchOutcome::NoMatch
    }
}

/// Run the engine against `scope`'s current expectations.
///
/// The read, the selection and the write-back of the incremented run count
/// happen under the scope lock. The list is only rewritten when something applied.
pub fn match_request(
    state: &State,
    scope: &ScopeKey,
    request: &RecordedRequest,
) -> Result<MatchOutcome, StoreError> {
    state.transaction(scope, |txn| {
        let store = txn.expectations();
        let mut expectations = store.read_all()?;
        let outcome = select(&mut expectations, request);
        if matches!(outcome, MatchOutcome::Matched { .. }) {
            store.replace(expectations)?;
        }
        Ok(outcome)
    })
}

//! Expectation and response descriptor types.

use crate::predicate::{Limiter, Matcher};
use crate::recording::Payload;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A registered rule: matchers + response + optional limiter + run counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expectation {
    #[serde(default)]
    pub matchers: Vec<Matcher>,
    pub response: ResponseSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limiter: Option<Limiter>,
    /// Times this expectation has been applied
    #[serde(default)]
    pub runs: u64,
}

impl Expectation {
    pub fn new(matchers: Vec<Matcher>, response: ResponseSpec, limiter: Option<Limiter>) -> Self {
        Self {
            matchers,
            response,
            limiter,
            runs: 0,
        }
    }
}

/// Response replayed when an expectation applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSpec {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default, deserialize_with = "deserialize_headers")]
    pub headers: Vec<HeaderPair>,
    #[serde(default)]
    pub body: Payload,
}

fn default_status() -> u16 {
    200
}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self {
            status: default_status(),
            headers: Vec::new(),
            body: Payload::default(),
        }
    }
}

impl ResponseSpec {
    pub fn with_body(status: u16, body: impl Into<Payload>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPair {
    pub name: String,
    pub value: String,
}

/// Headers are accepted as an object (`{"X-A": "1"}`) or as an ordered list of
/// `{"name", "value"}` pairs, which also allows repeated names.
#[derive(Deserialize)]
#[serde(untagged)]
enum HeadersRepr {
    Map(BTreeMap<String, String>),
    List(Vec<HeaderPair>),
}

pub(crate) fn deserialize_headers<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<HeaderPair>, D::Error> {
    Ok(match HeadersRepr::deserialize(d)? {
        HeadersRepr::Map(map) => map
            .into_iter()
            .map(|(name, value)| HeaderPair { name, value })
            .collect(),
        HeadersRepr::List(list) => list,
    })
}

//! String operators used by every field matcher.
//!
//! On the wire an operator is a set of optional keys of which exactly one must
//! be present: `value` (alias `equals`), `contains`, `startsWith`, `endsWith`,
//! `matches` (regex) or `exists`. `caseSensitive` is an optional modifier.

use crate::error::ValidationError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::Arc;

/// Wire form of a string operator.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StringOperator {
    #[serde(default, alias = "equals", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_with: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_with: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
}

impl StringOperator {
    pub fn equals(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub(super) fn present_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.value.is_some() {
            keys.push("value");
        }
        if self.contains.is_some() {
            keys.push("contains");
        }
        if self.starts_with.is_some() {
            keys.push("startsWith");
        }
        if self.ends_with.is_some() {
            keys.push("endsWith");
        }
        if self.matches.is_some() {
            keys.push("matches");
        }
        if self.exists.is_some() {
            keys.push("exists");
        }
        keys
    }
}

/// Compiled operator. Literal operands are stored lowercase when the
/// comparison is case-insensitive.
#[derive(Debug, Clone)]
pub enum CompiledStringMatcher {
    Equals(String),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    Matches(Arc<Regex>),
    Exists(bool),
}

/// A compiled operator together with its case sensitivity.
#[derive(Debug, Clone)]
pub struct StringMatch {
    matcher: CompiledStringMatcher,
    case_sensitive: bool,
}

impl StringMatch {
    /// Compile an operator. `default_case_sensitive` applies when the operator
    /// does not set `caseSensitive` itself.
    pub fn compile(
        operator: &StringOperator,
        default_case_sensitive: bool,
    ) -> Result<Self, ValidationError> {
        let case_sensitive = operator.case_sensitive.unwrap_or(default_case_sensitive);

        match operator.present_keys().as_slice() {
            [] => {
                return Err(ValidationError::new(
                    "",
                    "expected one of value, contains, startsWith, endsWith, matches, exists",
                ))
            }
            [_] => {}
            many => {
                return Err(ValidationError::new(
                    "",
                    format!("only one operator may be set, found {}", many.join(", ")),
                ))
            }
        }

        let fold = |v: &str| fold_case(v, case_sensitive).into_owned();
        let matcher = if let Some(v) = &operator.value {
            CompiledStringMatcher::Equals(fold(v))
        } else if let Some(v) = &operator.contains {
            CompiledStringMatcher::Contains(fold(v))
        } else if let Some(v) = &operator.starts_with {
            CompiledStringMatcher::StartsWith(fold(v))
        } else if let Some(v) = &operator.ends_with {
            CompiledStringMatcher::EndsWith(fold(v))
        } else if let Some(pattern) = &operator.matches {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .build()
                .map_err(|e| ValidationError::new("matches", e.to_string()))?;
            CompiledStringMatcher::Matches(Arc::new(regex))
        } else {
            CompiledStringMatcher::Exists(operator.exists.unwrap_or(true))
        };

        Ok(Self {
            matcher,
            case_sensitive,
        })
    }

    /// Check a field value; `None` means the field is absent.
    pub fn matches(&self, value: Option<&str>) -> bool {
        let value = match (&self.matcher, value) {
            (CompiledStringMatcher::Exists(should_exist), v) => return *should_exist == v.is_some(),
            (CompiledStringMatcher::Matches(regex), Some(v)) => return regex.is_match(v),
            (_, None) => return false,
            (_, Some(v)) => fold_case(v, self.case_sensitive),
        };
        match &self.matcher {
            CompiledStringMatcher::Equals(expected) => value == expected.as_str(),
            CompiledStringMatcher::Contains(needle) => value.contains(needle.as_str()),
            CompiledStringMatcher::StartsWith(prefix) => value.starts_with(prefix.as_str()),
            CompiledStringMatcher::EndsWith(suffix) => value.ends_with(suffix.as_str()),
            CompiledStringMatcher::Matches(_) | CompiledStringMatcher::Exists(_) => false,
        }
    }
}

fn fold_case(value: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(value.to_lowercase())
    }
}

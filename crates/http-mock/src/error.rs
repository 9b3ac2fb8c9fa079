//! Error types for http-mock.

use crate::state::Section;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the scoped stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Requested index or position does not exist, or the queue is empty
    #[error("{0}")]
    NotFound(String),

    /// Reading or writing persisted scope data failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Persisted scope data could not be encoded or decoded
    #[error("invalid {section} data: {source}")]
    Serialization {
        section: Section,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// A malformed matcher, limiter or response in an expectation registration.
///
/// `field` is a path such as `matcher[1].matches` or `response.status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Prefix the field path, e.g. `matches` under `matcher[2]` becomes `matcher[2].matches`.
    pub fn within(mut self, parent: &str) -> Self {
        self.field = if self.field.is_empty() {
            parent.to_string()
        } else if self.field.starts_with('[') {
            format!("{parent}{}", self.field)
        } else {
            format!("{parent}.{}", self.field)
        };
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors surfaced while registering an expectation.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_nesting() {
        let err = ValidationError::new("matches", "bad regex").within("matcher[2]");
        assert_eq!(err.field, "matcher[2].matches");
        assert_eq!(err.to_string(), "matcher[2].matches: bad regex");

        let err = ValidationError::new("", "must be an object").within("limiter");
        assert_eq!(err.to_string(), "limiter: must be an object");

        let err = ValidationError::new("[0]", "unknown kind").within("matcher");
        assert_eq!(err.field, "matcher[0]");
    }

    #[test]
    fn test_store_error_not_found() {
        let err = StoreError::NotFound("Index 3 not found".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Index 3 not found");
    }
}

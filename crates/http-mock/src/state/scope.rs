use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one isolated set of stores (one mock-server instance).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeKey(String);

impl ScopeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key bound to the running process.
    pub fn for_process() -> Self {
        Self(format!("pid-{}", std::process::id()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filename-safe, injective encoding of the key.
    pub fn file_stem(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScopeKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

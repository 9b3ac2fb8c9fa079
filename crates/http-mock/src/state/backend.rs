use super::scope::ScopeKey;
use crate::error::StoreError;
use std::fmt;

/// The independent collections kept per scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Expectations,
    Requests,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Expectations => "expectations",
            Section::Requests => "requests",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyed persistent storage for serialized scope sections.
///
/// Implementations do not need their own read-modify-write protection;
/// [`State`](super::State) serializes all access per scope key.
pub trait StateBackend: Send + Sync {
    /// Load a section, `None` if it was never written or has been removed
    fn load(&self, scope: &ScopeKey, section: Section) -> Result<Option<Vec<u8>>, StoreError>;

    /// Overwrite a section
    fn save(&self, scope: &ScopeKey, section: Section, data: Vec<u8>) -> Result<(), StoreError>;

    /// Remove a section
    fn remove(&self, scope: &ScopeKey, section: Section) -> Result<(), StoreError>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

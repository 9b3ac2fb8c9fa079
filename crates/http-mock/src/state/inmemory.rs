use super::backend::{Section, StateBackend};
use super::scope::ScopeKey;
use crate::error::StoreError;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory implementation of [`StateBackend`].
///
/// State lives as long as the process, which is the lifetime of a scope.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<HashMap<(ScopeKey, Section), Vec<u8>>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateBackend for InMemoryBackend {
    fn load(&self, scope: &ScopeKey, section: Section) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.read().get(&(scope.clone(), section)).cloned())
    }

    fn save(&self, scope: &ScopeKey, section: Section, data: Vec<u8>) -> Result<(), StoreError> {
        self.data.write().insert((scope.clone(), section), data);
        Ok(())
    }

    fn remove(&self, scope: &ScopeKey, section: Section) -> Result<(), StoreError> {
        self.data.write().remove(&(scope.clone(), section));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

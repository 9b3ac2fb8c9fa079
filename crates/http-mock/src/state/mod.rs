//! Scoped, persistent state for expectations and recorded requests.
//!
//! Every operation is addressed by a [`ScopeKey`]; there is no ambient global
//! store. [`State::transaction`] holds the scope's lock for the whole closure,
//! so read-modify-write sequences (a run-count increment, a queue shift) can
//! not interleave with other requests on the same scope. Different scopes
//! never contend.
//!
//! ```ignore
//! let state = State::in_memory();
//! let scope = ScopeKey::new("instance-1");
//! let count = state.transaction(&scope, |txn| txn.requests().count())?;
//! ```

mod backend;
mod expectations;
mod file;
mod inmemory;
mod requests;
mod scope;

pub use backend::{Section, StateBackend};
pub use expectations::Expectations;
pub use file::FileBackend;
pub use inmemory::InMemoryBackend;
pub use requests::{Position, Requests};
pub use scope::ScopeKey;

use crate::error::StoreError;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Stores for all scopes, over one backend.
pub struct State {
    backend: Arc<dyn StateBackend>,
    locks: Mutex<HashMap<ScopeKey, Arc<Mutex<()>>>>,
}

impl State {
    pub fn new(backend: Arc<dyn StateBackend>) -> Self {
        Self {
            backend,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBackend::new()))
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn scope_lock(&self, scope: &ScopeKey) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(scope.clone()).or_default())
    }

    /// Run `f` with exclusive access to `scope`'s stores.
    ///
    /// The closure is synchronous; the lock is never held across an await point.
    pub fn transaction<T, E, F>(&self, scope: &ScopeKey, f: F) -> Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    {
        let lock = self.scope_lock(scope);
        let _guard = lock.lock();
        let txn = Transaction {
            backend: self.backend.as_ref(),
            scope,
        };
        f(&txn)
    }
}

/// Exclusive access to one scope's stores for the duration of [`State::transaction`].
pub struct Transaction<'a> {
    backend: &'a dyn StateBackend,
    scope: &'a ScopeKey,
}

impl<'a> Transaction<'a> {
    /// Expectation Store view
    pub fn expectations(&self) -> Expectations<'_> {
        Expectations::new(self)
    }

    /// Request Queue view
    pub fn requests(&self) -> Requests<'_> {
        Requests::new(self)
    }

    fn load<T: DeserializeOwned>(&self, section: Section) -> Result<Vec<T>, StoreError> {
        match self.backend.load(self.scope, section)? {
            Some(data) => serde_json::from_slice(&data)
                .map_err(|source| StoreError::Serialization { section, source }),
            None => Ok(Vec::new()),
        }
    }

    fn save<T: Serialize>(&self, section: Section, items: &[T]) -> Result<(), StoreError> {
        let data = serde_json::to_vec(items)
            .map_err(|source| StoreError::Serialization { section, source })?;
        self.backend.save(self.scope, section, data)
    }

    fn clear(&self, section: Section) -> Result<(), StoreError> {
        self.backend.remove(self.scope, section)
    }
}

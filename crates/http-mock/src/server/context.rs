use crate::state::{ScopeKey, State};
use std::sync::Arc;

/// What every handler needs: the stores and the scope this instance serves.
#[derive(Clone)]
pub struct ServerContext {
    pub state: Arc<State>,
    pub scope: ScopeKey,
}

impl ServerContext {
    pub fn new(state: Arc<State>, scope: ScopeKey) -> Self {
        Self { state, scope }
    }
}

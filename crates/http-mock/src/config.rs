//! Configuration types for http-mock.

use crate::state::{FileBackend, InMemoryBackend, ScopeKey, State, StateBackend};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub listen: ListenConfig,

    #[serde(default)]
    pub state: StateConfig,

    /// Scope key for this instance's stores. Defaults to `pid-<process id>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> IpAddr {
    IpAddr::from([127, 0, 0, 1])
}

fn default_port() -> u16 {
    8082
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StateConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// State directory, required by the file backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.state.backend == BackendKind::File && self.state.dir.is_none() {
            anyhow::bail!("state.dir is required when state.backend is 'file'");
        }
        if let Some(scope) = &self.scope {
            if scope.trim().is_empty() {
                anyhow::bail!("scope must not be empty");
            }
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen.host, self.listen.port)
    }

    pub fn scope_key(&self) -> ScopeKey {
        match &self.scope {
            Some(scope) => ScopeKey::new(scope.as_str()),
            None => ScopeKey::for_process(),
        }
    }

    /// Open the configured backend.
    pub fn build_state(&self) -> Result<State, anyhow::Error> {
        let backend: Arc<dyn StateBackend> = match (self.state.backend, &self.state.dir) {
            (BackendKind::Memory, _) => Arc::new(InMemoryBackend::new()),
            (BackendKind::File, Some(dir)) => Arc::new(FileBackend::new(dir)?),
            (BackendKind::File, None) => {
                anyhow::bail!("state.dir is required when state.backend is 'file'")
            }
        };
        Ok(State::new(backend))
    }
}

use super::backend::{Section, StateBackend};
use super::scope::ScopeKey;
use crate::error::StoreError;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info};

/// File-backed [`StateBackend`]: one JSON file per scope and section,
/// `<dir>/<scope>-<section>.json`.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Use `dir` as the state directory, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        info!("Using state directory {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, scope: &ScopeKey, section: Section) -> PathBuf {
        self.dir
            .join(format!("{}-{}.json", scope.file_stem(), section.as_str()))
    }
}

impl StateBackend for FileBackend {
    fn load(&self, scope: &ScopeKey, section: Section) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(scope, section);
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn save(&self, scope: &ScopeKey, section: Section, data: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path_for(scope, section);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        // Rename is atomic on the same filesystem
        fs::rename(&tmp, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Wrote {}", path.display());
        Ok(())
    }

    fn remove(&self, scope: &ScopeKey, section: Section) -> Result<(), StoreError> {
        let path = self.path_for(scope, section);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

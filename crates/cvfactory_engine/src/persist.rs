use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("state directory {path:?} unusable: {reason}")]
    StateDir { path: PathBuf, reason: String },
    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Directory holding the client's small text state files.
#[derive(Debug, Clone)]
pub struct StateDir {
    dir: PathBuf,
}

impl StateDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Creates the directory if missing; fails if the path is something else.
    pub fn ensure(&self) -> Result<(), PersistError> {
        match fs::metadata(&self.dir) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(self.unusable("not a directory")),
            Err(err) if err.kind() == io::ErrorKind::NotFound => fs::create_dir_all(&self.dir)
                .map_err(|err| self.unusable(&err.to_string())),
            Err(err) => Err(self.unusable(&err.to_string())),
        }
    }

    /// Contents of `name`, or `None` when the file does not exist.
    pub fn read(&self, name: &str) -> Result<Option<String>, PersistError> {
        let path = self.dir.join(name);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistError::Io { path, source }),
        }
    }

    /// Replaces `name` through a temp file in the same directory and a
    /// rename, so readers never see a partial file.
    pub fn write_atomic(&self, name: &str, content: &str) -> Result<PathBuf, PersistError> {
        self.ensure()?;
        let target = self.dir.join(name);
        let io_err = |source| PersistError::Io {
            path: target.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        tmp.write_all(content.as_bytes()).map_err(io_err)?;
        tmp.as_file_mut().sync_all().map_err(io_err)?;
        tmp.persist(&target).map_err(|err| io_err(err.error))?;
        Ok(target)
    }

    fn unusable(&self, reason: &str) -> PersistError {
        PersistError::StateDir {
            path: self.dir.clone(),
            reason: reason.to_string(),
        }
    }
}

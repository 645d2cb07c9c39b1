//! Read-only view of the project tree under test

use std::path::{Path, PathBuf};

use crate::error::{HarnessError, HarnessResult};

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a project-relative path
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// True only for regular files; a directory at `relative` does not count.
    pub fn exists(&self, relative: impl AsRef<Path>) -> bool {
        self.path(relative).is_file()
    }

    pub fn read(&self, relative: impl AsRef<Path>) -> HarnessResult<String> {
        let relative = relative.as_ref();
        std::fs::read_to_string(self.path(relative)).map_err(|source| HarnessError::FileRead {
            path: relative.to_path_buf(),
            source,
        })
    }
}

//! File-backed fetcher
//!
//! Resolves plain paths and `file://` urls, relative ones against a base
//! directory (usually the manifest's folder). Remote schemes belong to an
//! external fetch collaborator and are reported as `FetchFailed`.

use log::debug;
use std::path::{Path, PathBuf};

use crate::entities::{Fetch, LoadError};

/// Reads animation documents from the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    base_dir: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative locators against `dir`
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(dir.into()),
        }
    }

    /// Map a locator to a filesystem path.
    pub fn resolve(&self, locator: &str) -> Result<PathBuf, LoadError> {
        let raw = if let Some(rest) = locator.strip_prefix("file://") {
            rest
        } else if let Some((scheme, _)) = locator.split_once("://") {
            return Err(LoadError::FetchFailed(format!(
                "unsupported scheme '{}' in {}",
                scheme, locator
            )));
        } else {
            locator
        };

        let path = Path::new(raw);
        Ok(match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        })
    }
}

impl Fetch for FileFetcher {
    fn fetch(&self, locator: &str) -> Result<String, LoadError> {
        let path = self.resolve(locator)?;
        debug!("Reading {}", path.display());
        std::fs::read_to_string(&path)
            .map_err(|e| LoadError::FetchFailed(format!("{}: {}", path.display(), e)))
    }
}

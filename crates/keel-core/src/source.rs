//! Artifact sources: where migration scripts are enumerated and read from.
//!
//! Two implementations are provided: [`DirectorySource`] for scripts on disk
//! and [`EmbeddedSource`] for scripts compiled into the binary with
//! `rust-embed`. The engine only sees the [`ArtifactSource`] trait.

use crate::error::{CoreError, CoreResult};
use rust_embed::Embed;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Enumerates migration artifacts and reads them by locator.
pub trait ArtifactSource: Send {
    /// Human-readable description of the location, for logging
    fn describe(&self) -> String;

    /// List candidate artifact locators in a stable (sorted) order
    fn locate(&self) -> CoreResult<Vec<String>>;

    /// Read the raw bytes behind a locator returned by [`locate`](Self::locate)
    fn read(&self, locator: &str) -> CoreResult<Vec<u8>>;
}

/// Migration scripts stored as files in a single directory.
///
/// Locators are full file paths. Subdirectories are not descended into. A
/// directory that does not exist yet lists nothing.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this source reads from
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactSource for DirectorySource {
    fn describe(&self) -> String {
        format!("directory '{}'", self.dir.display())
    }

    fn locate(&self) -> CoreResult<Vec<String>> {
        if !self.dir.exists() {
            log::warn!(
                "Migrations directory {} does not exist; no migrations found",
                self.dir.display()
            );
            return Ok(Vec::new());
        }
        if !self.dir.is_dir() {
            return Err(CoreError::SourceNotFound {
                location: self.dir.display().to_string(),
            });
        }

        let pattern = format!(
            "{}/*",
            glob::Pattern::escape(&self.dir.to_string_lossy())
        );
        let entries = glob::glob(&pattern).map_err(|e| CoreError::SourceListFailed {
            location: self.dir.display().to_string(),
            message: e.to_string(),
        })?;

        let mut locators = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| CoreError::SourceListFailed {
                location: self.dir.display().to_string(),
                message: e.to_string(),
            })?;
            if path.is_file() {
                locators.push(path.to_string_lossy().into_owned());
            }
        }
        locators.sort();
        Ok(locators)
    }

    fn read(&self, locator: &str) -> CoreResult<Vec<u8>> {
        std::fs::read(locator).map_err(|e| CoreError::ArtifactRead {
            locator: locator.to_string(),
            message: e.to_string(),
        })
    }
}

/// Migration scripts bundled into the binary via `#[derive(Embed)]`.
///
/// Locators are asset keys. When a prefix is set, only assets directly
/// inside that sub-directory of the bundle are listed.
pub struct EmbeddedSource<E: Embed> {
    prefix: Option<String>,
    _assets: PhantomData<fn() -> E>,
}

impl<E: Embed> EmbeddedSource<E> {
    /// List every top-level asset of the bundle
    pub fn new() -> Self {
        Self {
            prefix: None,
            _assets: PhantomData,
        }
    }

    /// List only assets directly under `prefix` (e.g. `"sqlite"`)
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_matches('/').to_string();
        Self {
            prefix: if prefix.is_empty() { None } else { Some(prefix) },
            _assets: PhantomData,
        }
    }

    fn relative<'a>(&self, key: &'a str) -> Option<&'a str> {
        let rest = match &self.prefix {
            Some(prefix) => key.strip_prefix(prefix.as_str())?.strip_prefix('/')?,
            None => key,
        };
        if rest.is_empty() || rest.contains('/') {
            None
        } else {
            Some(rest)
        }
    }
}

impl<E: Embed> Default for EmbeddedSource<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Embed> ArtifactSource for EmbeddedSource<E> {
    fn describe(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("embedded bundle '{prefix}/'"),
            None => "embedded bundle".to_string(),
        }
    }

    fn locate(&self) -> CoreResult<Vec<String>> {
        let mut locators: Vec<String> = E::iter()
            .filter(|key| self.relative(key).is_some())
            .map(|key| key.into_owned())
            .collect();
        locators.sort();
        Ok(locators)
    }

    fn read(&self, locator: &str) -> CoreResult<Vec<u8>> {
        E::get(locator)
            .map(|file| file.data.into_owned())
            .ok_or_else(|| CoreError::ArtifactRead {
                locator: locator.to_string(),
                message: "asset not found in embedded bundle".to_string(),
            })
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;

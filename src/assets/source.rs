use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::error::{TurnaboutError, TurnaboutResult};

/// Read-only access to an asset bundle.
///
/// Sprite resolution probes candidates with [`AssetSource::exists`] before reading, so a source
/// must answer existence queries without decoding anything.
pub trait AssetSource {
    /// Return `true` when `path` names a readable asset.
    fn exists(&self, path: &Path) -> bool;
    /// Read the raw bytes of `path`.
    fn read(&self, path: &Path) -> TurnaboutResult<Vec<u8>>;
}

/// Filesystem bundle rooted at a directory. Relative asset paths resolve against the root.
#[derive(Clone, Debug)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the bundle.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute (or root-joined) location of `path`.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl AssetSource for FsAssetSource {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_file()
    }

    fn read(&self, path: &Path) -> TurnaboutResult<Vec<u8>> {
        let full = self.resolve(path);
        if !full.is_file() {
            return Err(TurnaboutError::asset(format!(
                "'{}' does not exist",
                full.display()
            )));
        }
        let bytes =
            std::fs::read(&full).with_context(|| format!("read asset '{}'", full.display()))?;
        Ok(bytes)
    }
}

/// In-memory bundle, keyed by the exact relative path used in the catalog.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssetSource {
    files: BTreeMap<PathBuf, Arc<Vec<u8>>>,
}

impl MemoryAssetSource {
    /// Create an empty bundle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an asset.
    pub fn insert(&mut self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.files.insert(path.into(), Arc::new(bytes));
    }

    /// Number of assets in the bundle.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Return `true` when the bundle holds no assets.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetSource for MemoryAssetSource {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read(&self, path: &Path) -> TurnaboutResult<Vec<u8>> {
        self.files
            .get(path)
            .map(|b| b.as_ref().clone())
            .ok_or_else(|| TurnaboutError::asset(format!("'{}' does not exist", path.display())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;

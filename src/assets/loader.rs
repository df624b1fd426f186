use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::foundation::error::{CardError, CardResult};

/// Fetches raw asset bytes by template path (e.g. `./media/cat/bad/bad-head.png`).
///
/// Implementations are called from load worker threads.
pub trait AssetLoader: Send + Sync {
    /// Read the full contents of the asset at `path`.
    fn load(&self, path: &str) -> CardResult<Vec<u8>>;
}

/// Normalize and validate root-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> CardResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(CardError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(CardError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(CardError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(CardError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

/// Loads assets from a directory on disk. Template paths resolve relative to `root`.
#[derive(Clone, Debug)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    /// Loader rooted at `root` (the directory that contains `media/`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk location for a template path.
    pub fn resolve_path(&self, path: &str) -> CardResult<PathBuf> {
        let norm = normalize_rel_path(path)?;
        Ok(self.root.join(Path::new(&norm)))
    }
}

impl AssetLoader for FsLoader {
    fn load(&self, path: &str) -> CardResult<Vec<u8>> {
        let p = self.resolve_path(path)?;
        std::fs::read(&p)
            .map_err(|e| CardError::asset(format!("failed to read asset '{}': {e}", p.display())))
    }
}

/// In-memory asset table, keyed by normalized path.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryLoader {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `path`.
    pub fn insert(&mut self, path: &str, bytes: Vec<u8>) -> CardResult<()> {
        self.files.insert(normalize_rel_path(path)?, bytes);
        Ok(())
    }

    /// Builder form of [`MemoryLoader::insert`].
    pub fn with(mut self, path: &str, bytes: Vec<u8>) -> CardResult<Self> {
        self.insert(path, bytes)?;
        Ok(self)
    }
}

impl AssetLoader for MemoryLoader {
    fn load(&self, path: &str) -> CardResult<Vec<u8>> {
        let norm = normalize_rel_path(path)?;
        self.files
            .get(&norm)
            .cloned()
            .ok_or_else(|| CardError::asset(format!("asset not found: '{path}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;

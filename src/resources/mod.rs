//! Everything that turns files into engine data: asset access, OBJ/MTL
//! parsing, texture lookup and the process-wide mesh cache.

use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
};

use thiserror::Error;

pub mod mesh;
pub mod mtl;
pub mod registry;
pub mod texture;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("asset {0} does not exist")]
    NotFound(PathBuf),
}

/// Read access to text assets addressed by paths relative to an asset root.
pub trait AssetSource {
    fn load_string(&self, path: &Path) -> anyhow::Result<String>;
    fn exists(&self, path: &Path) -> bool;
}

/// Assets on disk below a root directory, `./assets` by default.
#[derive(Clone, Debug)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for FsAssets {
    fn default() -> Self {
        Self::new(Path::new("./").join("assets"))
    }
}

impl AssetSource for FsAssets {
    fn load_string(&self, path: &Path) -> anyhow::Result<String> {
        let full = self.root.join(path);
        if !full.is_file() {
            return Err(AssetError::NotFound(path.to_path_buf()).into());
        }
        Ok(std::fs::read_to_string(full)?)
    }

    fn exists(&self, path: &Path) -> bool {
        self.root.join(path).is_file()
    }
}

/// In-memory assets, mostly for tests and embedded scenes.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssets {
    files: HashMap<PathBuf, String>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> &mut Self {
        self.files.insert(normalize(path.as_ref()), contents.into());
        self
    }

    pub fn with(mut self, path: impl AsRef<Path>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }
}

impl AssetSource for MemoryAssets {
    fn load_string(&self, path: &Path) -> anyhow::Result<String> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_path_buf()).into())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize(path))
    }
}

/// Drops `.` components so `./a/b` and `a/b` name the same asset.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

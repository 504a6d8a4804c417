use std::path::{Path, PathBuf};

/// Resolves the directory that `swark:` locators are relative to.
///
/// Only the package scheme depends on where the library is installed, so
/// that knowledge is injected instead of hard-coded.
pub trait PackageRoot: Send + Sync {
    fn root(&self) -> PathBuf;
}

/// A package root fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedRoot(PathBuf);

impl FixedRoot {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self(path.as_ref().to_path_buf())
    }
}

impl PackageRoot for FixedRoot {
    fn root(&self) -> PathBuf {
        self.0.clone()
    }
}

impl<F> PackageRoot for F
where
    F: Fn() -> PathBuf + Send + Sync,
{
    fn root(&self) -> PathBuf {
        self()
    }
}

//! Crate manifest discovery
//!
//! Provides [`ManifestLocator`], which walks upward from a resource to the nearest
//! directory holding a `Cargo.toml`. The manifest's contents are never read.

use crate::infra::{FileSystem, RealFileSystem};
use std::path::{Path, PathBuf};

/// File whose presence marks a crate source root
pub const MANIFEST_FILE_NAME: &str = "Cargo.toml";

/// Finds the source directory a resource belongs to
///
/// # Examples
///
/// ```no_run
/// use wasm_loader::pipeline::manifest::ManifestLocator;
/// use std::path::Path;
///
/// # async fn run() {
/// let locator = ManifestLocator::new();
/// if let Some(dir) = locator.find_source_dir(Path::new("/work/app/src/lib.rs")).await {
///     println!("crate root: {}", dir.display());
/// }
/// # }
/// ```
pub struct ManifestLocator<FS: FileSystem = RealFileSystem> {
    fs: FS,
}

impl Default for ManifestLocator<RealFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestLocator<RealFileSystem> {
    /// Create a locator over the real filesystem
    pub fn new() -> Self {
        Self::with_fs(RealFileSystem)
    }
}

impl<FS: FileSystem> ManifestLocator<FS> {
    /// Create a locator with a custom filesystem implementation
    pub fn with_fs(fs: FS) -> Self {
        Self { fs }
    }

    /// Nearest directory at or above `start`'s parent that contains a manifest
    ///
    /// Returns `None` when the walk reaches the filesystem root without a match.
    pub async fn find_source_dir(&self, start: &Path) -> Option<PathBuf> {
        let first = start.parent()?;
        for dir in first.ancestors() {
            if self.fs.is_file(&dir.join(MANIFEST_FILE_NAME)).await {
                log::debug!("found {} in {}", MANIFEST_FILE_NAME, dir.display());
                return Some(dir.to_path_buf());
            }
        }
        None
    }
}

/// Path of the manifest inside a source directory
pub fn manifest_path(source_dir: &Path) -> PathBuf {
    source_dir.join(MANIFEST_FILE_NAME)
}

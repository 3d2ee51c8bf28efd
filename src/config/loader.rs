//! Loader options file loading

use super::options::LoaderOptions;
use crate::error::LoaderError;
use crate::infra::{FileSystem, RealFileSystem};
use std::path::Path;

/// Handles loading loader options from disk
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load options from `path`.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as TOML. Both use the
    /// same camelCase keys.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wasm_loader::config::ConfigLoader;
    /// use std::path::Path;
    ///
    /// # async fn run() -> Result<(), wasm_loader::error::LoaderError> {
    /// let options = ConfigLoader::load(Path::new("wasm-loader.toml")).await?;
    /// println!("release: {:?}", options.release);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn load(path: &Path) -> Result<LoaderOptions, LoaderError> {
        Self::load_with_fs(path, &RealFileSystem).await
    }

    /// Load options with a custom filesystem implementation
    pub async fn load_with_fs<FS: FileSystem>(
        path: &Path,
        fs: &FS,
    ) -> Result<LoaderOptions, LoaderError> {
        let contents =
            fs.read_to_string(path)
                .await
                .map_err(|source| LoaderError::ConfigNotFound {
                    path: path.to_path_buf(),
                    source,
                })?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        };

        parsed.map_err(|reason| LoaderError::InvalidConfig {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse a JSON options bag
    pub fn from_json_str(contents: &str) -> Result<LoaderOptions, String> {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    }

    /// Parse TOML options
    pub fn from_toml_str(contents: &str) -> Result<LoaderOptions, String> {
        toml_edit::de::from_str(contents).map_err(|e| e.to_string())
    }
}

//! The bundler side of a build
//!
//! [`LoaderHost`] is what the loader needs from whoever drives it: the resource
//! being loaded, dependency registration, asset emission and a diagnostic channel.

use std::path::{Path, PathBuf};

/// Services a host bundler provides to one build
pub trait LoaderHost {
    /// Resource being transformed
    fn resource_path(&self) -> &Path;

    /// Directory module requests are resolved against
    ///
    /// Defaults to the resource's directory.
    fn context(&self) -> PathBuf {
        self.resource_path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Rebuild the module when `path` changes
    fn add_dependency(&mut self, path: &Path);

    /// Emit an asset under `name`
    fn emit_file(&mut self, name: &str, bytes: Vec<u8>);

    /// Report a non-fatal warning
    fn emit_warning(&mut self, message: &str);

    /// Report a build error for this module
    fn emit_error(&mut self, message: &str);
}

/// A host that records every interaction
///
/// # Examples
///
/// ```
/// use wasm_loader::host::{CollectingHost, LoaderHost};
/// use std::path::Path;
///
/// let mut host = CollectingHost::new("/app/src/lib.rs");
/// host.emit_warning("unused variable");
/// assert_eq!(host.context(), Path::new("/app/src"));
/// assert_eq!(host.warnings, ["unused variable"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectingHost {
    /// Resource being transformed
    pub resource_path: PathBuf,
    /// Context override
    pub context: Option<PathBuf>,
    /// Registered dependencies
    pub dependencies: Vec<PathBuf>,
    /// Emitted assets as `(name, bytes)`
    pub files: Vec<(String, Vec<u8>)>,
    /// Reported warnings
    pub warnings: Vec<String>,
    /// Reported errors
    pub errors: Vec<String>,
}

impl CollectingHost {
    /// Host for `resource_path` with the default context
    pub fn new(resource_path: impl Into<PathBuf>) -> Self {
        Self {
            resource_path: resource_path.into(),
            ..Default::default()
        }
    }

    /// Resolve module requests against `context` instead
    pub fn with_context(mut self, context: impl Into<PathBuf>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl LoaderHost for CollectingHost {
    fn resource_path(&self) -> &Path {
        &self.resource_path
    }

    fn context(&self) -> PathBuf {
        match &self.context {
            Some(context) => context.clone(),
            None => self
                .resource_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }

    fn add_dependency(&mut self, path: &Path) {
        self.dependencies.push(path.to_path_buf());
    }

    fn emit_file(&mut self, name: &str, bytes: Vec<u8>) {
        self.files.push((name.to_string(), bytes));
    }

    fn emit_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn emit_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

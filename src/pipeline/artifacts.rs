//! Build artifact discovery
//!
//! Picks the `.wasm` binary and `.js` glue out of a compiler run's artifact records.
//! Dependencies are compiled before the target crate, so for each kind the last
//! reported file wins.

use std::path::{Path, PathBuf};

use super::process::CompilerInvocation;
use crate::error::BuildError;

/// The build outputs chosen for post-processing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedArtifacts {
    /// Last reported `.wasm` file
    pub wasm_file: Option<PathBuf>,
    /// Last reported `.js` file
    pub js_file: Option<PathBuf>,
}

impl ResolvedArtifacts {
    /// The wasm binary, or [`BuildError::NoWasmArtifact`]
    pub fn wasm_file(&self) -> Result<&Path, BuildError> {
        self.wasm_file.as_deref().ok_or(BuildError::NoWasmArtifact)
    }

    /// The JS glue, or [`BuildError::NoJsArtifact`]
    pub fn js_file(&self) -> Result<&Path, BuildError> {
        self.js_file.as_deref().ok_or(BuildError::NoJsArtifact)
    }
}

/// Resolves artifacts from a compiler invocation
pub struct ArtifactResolver;

impl ArtifactResolver {
    /// Scan artifact records without judging the exit status
    pub fn scan(invocation: &CompilerInvocation) -> ResolvedArtifacts {
        let mut resolved = ResolvedArtifacts::default();

        for file in invocation.messages.iter().flat_map(|m| m.artifact_files()) {
            match file.extension().and_then(|ext| ext.to_str()) {
                Some("wasm") => resolved.wasm_file = Some(file.to_path_buf()),
                Some("js") => resolved.js_file = Some(file.to_path_buf()),
                _ => {}
            }
        }

        resolved
    }

    /// Resolve the artifacts of `invocation`
    ///
    /// A failed run is only fatal when it left no wasm binary behind; some cargo
    /// subcommand wrappers exit non-zero after a usable build.
    ///
    /// # Errors
    ///
    /// - [`BuildError::CompileFailed`] for a failed run with no wasm artifact
    /// - [`BuildError::NoWasmArtifact`] for a successful run with no wasm artifact
    pub fn resolve(invocation: &CompilerInvocation) -> Result<ResolvedArtifacts, BuildError> {
        let resolved = Self::scan(invocation);

        match (&resolved.wasm_file, invocation.success) {
            (None, false) => {
                return Err(BuildError::CompileFailed {
                    diagnostics: invocation.diagnostics(),
                })
            }
            (None, true) => return Err(BuildError::NoWasmArtifact),
            (Some(wasm), false) => log::warn!(
                "compiler exited with {:?} but produced {}; continuing",
                invocation.exit_code,
                wasm.display()
            ),
            (Some(_), true) => {}
        }

        log::debug!(
            "resolved artifacts: wasm={:?} js={:?}",
            resolved.wasm_file,
            resolved.js_file
        );
        Ok(resolved)
    }
}

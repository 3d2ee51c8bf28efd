//! Typed model of cargo's `--message-format=json` records
//!
//! Only the fields the loader reads are modelled, and every one of them tolerates
//! older record layouts (cargo-web re-emits artifact records in its own format).

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One JSON record emitted by cargo (or a cargo subcommand)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum CargoMessage {
    /// A compilation unit finished and produced files
    CompilerArtifact(Artifact),
    /// A rustc diagnostic
    CompilerMessage(CompilerDiagnostic),
    /// A build script ran
    BuildScriptExecuted(BuildScriptOutput),
    /// The whole build finished
    BuildFinished(BuildFinished),
    /// Any other record kind
    #[serde(other)]
    Unknown,
}

/// Payload of a `compiler-artifact` record
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Artifact {
    /// Package that produced the artifact
    #[serde(default)]
    pub package_id: String,
    /// Target within the package
    #[serde(default)]
    pub target: ArtifactTarget,
    /// Files written for this unit, in cargo's order
    pub filenames: Vec<PathBuf>,
    /// Whether the unit was up to date
    #[serde(default)]
    pub fresh: bool,
}

/// Target description inside an artifact record
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ArtifactTarget {
    /// Target name
    #[serde(default)]
    pub name: String,
    /// Target kinds (`lib`, `cdylib`, `bin`, ...)
    #[serde(default)]
    pub kind: Vec<String>,
}

/// Payload of a `compiler-message` record
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompilerDiagnostic {
    /// Package the diagnostic belongs to
    #[serde(default)]
    pub package_id: String,
    /// The diagnostic itself
    pub message: Diagnostic,
}

/// A rustc diagnostic
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Diagnostic {
    /// Severity
    pub level: DiagnosticLevel,
    /// Short message
    #[serde(default)]
    pub message: String,
    /// Human-readable rendering, as rustc would print it
    #[serde(default)]
    pub rendered: Option<String>,
}

impl Diagnostic {
    /// Rendered text, falling back to the short message
    pub fn text(&self) -> &str {
        self.rendered.as_deref().unwrap_or(&self.message)
    }
}

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticLevel {
    /// Internal compiler error
    #[serde(rename = "error: internal compiler error")]
    Ice,
    /// Error
    Error,
    /// Warning
    Warning,
    /// Failure note
    FailureNote,
    /// Note
    Note,
    /// Help
    Help,
    /// Anything newer
    #[serde(other)]
    Other,
}

impl DiagnosticLevel {
    /// Whether this level fails the build
    pub fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::Ice)
    }
}

/// Payload of a `build-script-executed` record
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildScriptOutput {
    /// Package whose build script ran
    #[serde(default)]
    pub package_id: String,
    /// Build script output directory
    #[serde(default)]
    pub out_dir: Option<PathBuf>,
}

/// Payload of a `build-finished` record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BuildFinished {
    /// Whether cargo considered the build successful
    pub success: bool,
}

impl CargoMessage {
    /// Parse one output line; `None` for lines that are not a cargo JSON record
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if !trimmed.starts_with('{') {
            return None;
        }
        match serde_json::from_str(trimmed) {
            Ok(message) => Some(message),
            Err(e) => {
                log::debug!("ignoring unparseable JSON line ({e}): {trimmed}");
                None
            }
        }
    }

    /// Files listed by a `compiler-artifact` record
    pub fn artifact_files(&self) -> impl Iterator<Item = &Path> {
        let files: &[PathBuf] = match self {
            Self::CompilerArtifact(artifact) => &artifact.filenames,
            _ => &[],
        };
        files.iter().map(PathBuf::as_path)
    }
}

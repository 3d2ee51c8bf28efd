//! Error types with contextual suggestions
//!
//! Two layers live here:
//! - [`BuildError`]: the recoverable build failure. The loader reports it to the host
//!   and replaces the module with one that throws the same message when evaluated.
//! - [`LoaderError`]: the CLI-facing error, with actionable suggestions, documentation
//!   links and exit codes for CI/CD.
//!
//! # Examples
//!
//! ```
//! use wasm_loader::error::BuildError;
//!
//! let err = BuildError::NoWasmArtifact;
//! assert_eq!(err.to_string(), "No wasm file produced as build output");
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::PipelineError;
use crate::tools::ToolError;

/// A recoverable build failure.
///
/// The `Display` text is the message shown to the user and thrown by the placeholder
/// module. Every other error kind in the crate is fatal to the host build.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No `Cargo.toml` between the resource and the filesystem root
    #[error("No Cargo.toml file found in any parent directory.")]
    NoManifest,

    /// An external tool reported a version outside the supported range
    #[error("{tool} version not supported; got {found} but need {required}")]
    UnsupportedVersion {
        /// Tool name
        tool: String,
        /// Version reported by the tool
        found: String,
        /// Required semver range
        required: String,
    },

    /// `--version` output did not contain a `major.minor.patch` token
    #[error("could not determine {tool} version from output: {output}")]
    UnparseableVersion {
        /// Tool name
        tool: String,
        /// Raw version output
        output: String,
    },

    /// The compiler exited non-zero and produced no usable artifact
    #[error("Cargo build failed\n{diagnostics}")]
    CompileFailed {
        /// Captured compiler diagnostics
        diagnostics: String,
    },

    /// The compiler reported no `.wasm` artifact
    #[error("No wasm file produced as build output")]
    NoWasmArtifact,

    /// The compiler reported no `.js` artifact (cargo-web builds)
    #[error("No js file produced as build output")]
    NoJsArtifact,

    /// A post-processing tool exited non-zero
    #[error("{tool} failed\n{diagnostics}")]
    ToolFailed {
        /// Tool name
        tool: String,
        /// Captured stderr/stdout
        diagnostics: String,
    },
}

/// CLI-facing errors with contextual suggestions
#[derive(Error, Debug)]
pub enum LoaderError {
    /// Loader options file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path to config file
        path: PathBuf,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Loader options file could not be parsed
    #[error("Invalid configuration in {path}: {reason}")]
    InvalidConfig {
        /// Path to config file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// One or more build errors were reported for the module
    #[error("{count} build error(s) reported for {resource}")]
    BuildReported {
        /// Resource that failed
        resource: PathBuf,
        /// Number of errors emitted
        count: usize,
    },

    /// Generic I/O error with context
    #[error("I/O error: {context}")]
    Io {
        /// Context about where the error occurred
        context: String,
        #[source]
        /// IO error source
        source: std::io::Error,
    },

    /// Fatal pipeline error
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

impl LoaderError {
    /// Get actionable suggestion for resolving this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use wasm_loader::error::LoaderError;
    /// use wasm_loader::pipeline::PipelineError;
    /// use wasm_loader::tools::ToolError;
    ///
    /// let error = LoaderError::Pipeline(PipelineError::Tool(ToolError::MissingTool {
    ///     tool: "wasm-gc".to_string(),
    ///     install_hint: "cargo install wasm-gc".to_string(),
    /// }));
    ///
    /// assert_eq!(error.suggestion().unwrap(), "Install with: cargo install wasm-gc");
    /// ```
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::ConfigNotFound { path, .. } => {
                Some(format!("Check that {} exists", path.display()))
            }
            Self::InvalidConfig { .. } => Some(
                "Recognized options: release, gc, target, cargoWeb{name, regExp}, \
                 wasmBindgen{typescript, nodejs, debug, wasm2es6js}"
                    .to_string(),
            ),
            Self::BuildReported { .. } => {
                Some("Check the build errors above and fix compilation issues".to_string())
            }
            Self::Io { context, .. } => Some(format!(
                "Check file permissions and that {} is accessible",
                context
            )),
            Self::Pipeline(PipelineError::Tool(ToolError::MissingTool { install_hint, .. })) => {
                Some(format!("Install with: {}", install_hint))
            }
            Self::Pipeline(PipelineError::Tool(ToolError::VersionFailed(tool))) => Some(format!(
                "Run `{} --version` in the crate directory to see what it reports",
                tool
            )),
            Self::Pipeline(_) => None,
        }
    }

    /// Get documentation URL for this error.
    pub fn docs_url(&self) -> Option<&str> {
        match self {
            Self::ConfigNotFound { .. } | Self::InvalidConfig { .. } => {
                Some("https://github.com/vitalratel/wasm-loader#options")
            }
            Self::Pipeline(PipelineError::Tool(_)) => {
                Some("https://github.com/vitalratel/wasm-loader#toolchains")
            }
            _ => None,
        }
    }

    /// Get appropriate exit code for this error.
    ///
    /// Follows sysexits.h conventions.
    ///
    /// # Examples
    ///
    /// ```
    /// use wasm_loader::error::LoaderError;
    /// use wasm_loader::pipeline::PipelineError;
    /// use wasm_loader::tools::ToolError;
    ///
    /// let error = LoaderError::Pipeline(PipelineError::Tool(ToolError::MissingTool {
    ///     tool: "wasm-bindgen".to_string(),
    ///     install_hint: "cargo install wasm-bindgen-cli".to_string(),
    /// }));
    ///
    /// assert_eq!(error.exit_code(), 127); // Command not found
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. } => 66, // EX_NOINPUT (sysexits.h)
            Self::InvalidConfig { .. } => 65,  // EX_DATAERR
            Self::BuildReported { .. } => 1,
            Self::Io { .. } => 74, // EX_IOERR
            Self::Pipeline(PipelineError::Tool(ToolError::MissingTool { .. })) => 127,
            Self::Pipeline(_) => 1,
        }
    }
}

/// Renders CLI errors for the terminal
///
/// The first line of the message is the headline. Further lines (compiler or tool
/// output carried by the error) are printed below it in a gutter. Causes whose text
/// the headline already shows are skipped.
pub struct ErrorFormatter;

impl ErrorFormatter {
    /// Format error with suggestions and documentation links
    pub fn format(error: &anyhow::Error) -> String {
        use console::style;

        let message = error.to_string();
        let mut lines = message.lines();
        let headline = lines.next().unwrap_or_default();

        let mut output = format!("{} {}\n", style("error:").red().bold(), headline);
        for line in lines {
            output.push_str(&format!("  {} {}\n", style("│").dim(), line));
        }

        let mut source = error.source();
        while let Some(err) = source {
            let text = err.to_string();
            if !message.contains(&text) {
                output.push_str(&format!("  {} {}\n", style("caused by:").yellow(), text));
            }
            source = err.source();
        }

        if let Some(loader_error) = error.downcast_ref::<LoaderError>() {
            if let Some(suggestion) = loader_error.suggestion() {
                output.push_str(&format!(
                    "\n{} {}\n",
                    style("help:").cyan().bold(),
                    suggestion
                ));
            }

            if let Some(docs) = loader_error.docs_url() {
                output.push_str(&format!("{} {}\n", style("docs:").blue(), docs));
            }
        }

        output
    }

    /// Get exit code from error
    pub fn exit_code(error: &anyhow::Error) -> i32 {
        error
            .downcast_ref::<LoaderError>()
            .map_or(1, LoaderError::exit_code)
    }
}

//! Post-processing strategies
//!
//! Exactly one strategy runs per build, chosen from the configuration:
//! - [`RawStrategy`]: re-export the binary, optionally after wasm-gc
//! - [`WasmBindgenStrategy`]: wasm-bindgen glue, optionally wasm2es6js
//! - [`CargoWebStrategy`]: cargo-web glue plus an emitted, content-named binary

mod cargo_web;
mod raw;
mod wasm_bindgen;

pub use cargo_web::{rewrite_glue, CargoWebStrategy, FETCH_REPLACEMENT_PREFIX};
pub use raw::{gc_path, RawStrategy};
pub use wasm_bindgen::{WasmBindgenStrategy, BIND_GEN_DIR};

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::artifacts::ResolvedArtifacts;
use super::error::PipelineError;
use super::process::ProcessRunner;
use super::request::BuildRequest;
use crate::config::{BuildConfiguration, StrategyKind};
use crate::infra::{CommandExecutor, FileSystem};
use crate::tools::{Tool, CARGO_WEB, WASM_BINDGEN};

/// A binary the host should emit next to the bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    /// Public file name
    pub name: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Result of a strategy: module source plus assets to emit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleOutput {
    /// Module source text
    pub source: String,
    /// Assets to emit, in order
    pub assets: Vec<EmittedAsset>,
}

impl ModuleOutput {
    /// Output consisting only of source text
    pub fn source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            assets: Vec::new(),
        }
    }
}

/// Collaborators a strategy works with during one build
pub struct StrategyContext<'a, FS: FileSystem, CE: CommandExecutor> {
    /// File access
    pub fs: &'a FS,
    /// Secondary tool execution
    pub runner: &'a ProcessRunner<CE>,
    /// The build being served
    pub request: &'a BuildRequest,
}

/// The selected post-processing strategy
#[derive(Debug, Clone)]
pub enum BuildStrategy {
    /// Plain binary re-export
    Raw(RawStrategy),
    /// wasm-bindgen glue
    WasmBindgen(WasmBindgenStrategy),
    /// cargo-web glue
    CargoWeb(CargoWebStrategy),
}

impl BuildStrategy {
    /// Strategy for `config`
    pub fn from_config(config: &BuildConfiguration) -> Self {
        match &config.strategy {
            StrategyKind::Raw => Self::Raw(RawStrategy {
                garbage_collect: config.garbage_collect,
            }),
            StrategyKind::WasmBindgen(options) => {
                Self::WasmBindgen(WasmBindgenStrategy { options: *options })
            }
            StrategyKind::CargoWeb(options) => Self::CargoWeb(CargoWebStrategy {
                options: options.clone(),
            }),
        }
    }

    /// Tool whose version must be checked before compiling
    pub fn gated_tool(&self) -> Option<&'static Tool> {
        match self {
            Self::Raw(_) => None,
            Self::WasmBindgen(_) => Some(&WASM_BINDGEN),
            Self::CargoWeb(_) => Some(&CARGO_WEB),
        }
    }

    /// Turn resolved artifacts into module output
    pub async fn execute<FS: FileSystem, CE: CommandExecutor>(
        &self,
        ctx: &StrategyContext<'_, FS, CE>,
        artifacts: &ResolvedArtifacts,
    ) -> Result<ModuleOutput, PipelineError> {
        match self {
            Self::Raw(strategy) => strategy.execute(ctx, artifacts).await,
            Self::WasmBindgen(strategy) => strategy.execute(ctx, artifacts).await,
            Self::CargoWeb(strategy) => strategy.execute(ctx, artifacts).await,
        }
    }
}

/// `base` with `suffix` appended to its final component
pub(crate) fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut path = OsString::from(base.as_os_str());
    path.push(suffix);
    PathBuf::from(path)
}

/// File name of `path` as UTF-8, lossily
pub(crate) fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

//! Build orchestration
//!
//! One build runs these stages in order, stopping at the first failure:
//! locate manifest, version gate, compile, resolve artifacts, post-process.
//!
//! A [`BuildError`] from any stage is reported to the host and replaced by a module
//! that throws the same message when evaluated, so the rest of the host build
//! carries on. Every other error propagates.

use super::artifacts::ArtifactResolver;
use super::error::PipelineError;
use super::manifest::{manifest_path, ManifestLocator};
use super::process::{CompilerCommand, ProcessRunner};
use super::request::BuildRequest;
use super::strategy::{BuildStrategy, StrategyContext};
use super::version_gate::VersionGate;
use crate::config::BuildConfiguration;
use crate::error::BuildError;
use crate::host::LoaderHost;
use crate::infra::{CommandExecutor, FileSystem, RealCommandExecutor, RealFileSystem};

/// Module body that throws `message` when evaluated
///
/// ```
/// use wasm_loader::pipeline::placeholder_module;
///
/// assert_eq!(
///     placeholder_module("No wasm file produced as build output"),
///     "throw new Error(\"No wasm file produced as build output\");\n"
/// );
/// ```
pub fn placeholder_module(message: &str) -> String {
    format!(
        "throw new Error({});\n",
        serde_json::Value::String(message.to_string())
    )
}

/// Turns a crate into module source for a host bundler
///
/// Holds no per-build state: concurrent `load` calls for different resources are
/// independent.
///
/// # Examples
///
/// ```no_run
/// use wasm_loader::config::BuildConfiguration;
/// use wasm_loader::host::CollectingHost;
/// use wasm_loader::pipeline::Loader;
///
/// # async fn run() -> Result<(), wasm_loader::pipeline::PipelineError> {
/// let loader = Loader::new();
/// let mut host = CollectingHost::new("/work/app/src/lib.rs");
/// let source = loader.load(&mut host, &BuildConfiguration::default()).await?;
/// println!("{source}");
/// # Ok(())
/// # }
/// ```
pub struct Loader<FS: FileSystem = RealFileSystem, CE: CommandExecutor = RealCommandExecutor> {
    fs: FS,
    cmd_executor: CE,
}

impl Default for Loader<RealFileSystem, RealCommandExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader<RealFileSystem, RealCommandExecutor> {
    /// Loader over the real filesystem and real processes
    pub fn new() -> Self {
        Self::with_executors(RealFileSystem, RealCommandExecutor)
    }
}

impl<FS: FileSystem, CE: CommandExecutor> Loader<FS, CE> {
    /// Loader with custom filesystem and command executor implementations
    pub fn with_executors(fs: FS, cmd_executor: CE) -> Self {
        Self { fs, cmd_executor }
    }

    /// Build the host's resource and return module source
    ///
    /// Build errors come back as `Ok` with a throwing module, after being passed to
    /// [`LoaderHost::emit_error`].
    pub async fn load<H: LoaderHost>(
        &self,
        host: &mut H,
        config: &BuildConfiguration,
    ) -> Result<String, PipelineError> {
        match self.build(host, config).await {
            Ok(source) => Ok(source),
            Err(PipelineError::Build(e)) => {
                let message = e.to_string();
                log::warn!(
                    "build of {} failed: {}",
                    host.resource_path().display(),
                    message
                );
                host.emit_error(&message);
                Ok(placeholder_module(&message))
            }
            Err(e) => Err(e),
        }
    }

    async fn build<H: LoaderHost>(
        &self,
        host: &mut H,
        config: &BuildConfiguration,
    ) -> Result<String, PipelineError> {
        let resource_path = host.resource_path().to_path_buf();
        let source_dir = ManifestLocator::with_fs(&self.fs)
            .find_source_dir(&resource_path)
            .await
            .ok_or(BuildError::NoManifest)?;
        host.add_dependency(&manifest_path(&source_dir));

        let request = BuildRequest {
            resource_path,
            context: host.context(),
            source_dir,
        };
        let strategy = BuildStrategy::from_config(config);
        log::info!(
            "building {} ({} strategy, source dir {})",
            request.resource_path.display(),
            config.strategy.name(),
            request.source_dir.display()
        );

        if let Some(tool) = strategy.gated_tool() {
            VersionGate::new(&self.cmd_executor)
                .check(tool, &request.source_dir)
                .await?;
        }

        let runner = ProcessRunner::new(&self.cmd_executor);
        let invocation = runner
            .run_compiler(&CompilerCommand::for_config(config), &request.source_dir)
            .await?;
        let artifacts = ArtifactResolver::resolve(&invocation)?;

        let ctx = StrategyContext {
            fs: &self.fs,
            runner: &runner,
            request: &request,
        };
        let output = strategy.execute(&ctx, &artifacts).await?;

        for warning in invocation.warnings() {
            host.emit_warning(warning);
        }
        for asset in output.assets {
            host.emit_file(&asset.name, asset.bytes);
        }
        Ok(output.source)
    }
}

use std::path::{Path, PathBuf};

use super::{ModuleOutput, StrategyContext};
use crate::infra::{CommandExecutor, FileSystem};
use crate::pipeline::artifacts::ResolvedArtifacts;
use crate::pipeline::error::PipelineError;
use crate::tools::WASM_GC;

/// Re-exports the compiled binary as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStrategy {
    /// Run wasm-gc first
    pub garbage_collect: bool,
}

/// Sibling of `wasm_file` with a `.gc` infix: `app.wasm` -> `app.gc.wasm`
pub fn gc_path(wasm_file: &Path) -> PathBuf {
    wasm_file.with_extension("gc.wasm")
}

impl RawStrategy {
    pub(super) async fn execute<FS: FileSystem, CE: CommandExecutor>(
        &self,
        ctx: &StrategyContext<'_, FS, CE>,
        artifacts: &ResolvedArtifacts,
    ) -> Result<ModuleOutput, PipelineError> {
        let mut wasm_file = artifacts.wasm_file()?.to_path_buf();

        if self.garbage_collect {
            let gc_file = gc_path(&wasm_file);
            ctx.runner
                .run_tool(
                    &WASM_GC,
                    [wasm_file.as_os_str(), gc_file.as_os_str()],
                    &ctx.request.source_dir,
                )
                .await?;
            wasm_file = gc_file;
        }

        let request = ctx.request.module_request(&wasm_file);
        Ok(ModuleOutput::source(format!("export * from {request};")))
    }
}

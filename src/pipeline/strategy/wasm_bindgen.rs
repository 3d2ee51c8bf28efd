use std::ffi::{OsStr, OsString};
use std::path::Path;

use super::{with_suffix, ModuleOutput, StrategyContext};
use crate::config::WasmBindgenOptions;
use crate::infra::{CommandExecutor, FileSystem};
use crate::pipeline::artifacts::ResolvedArtifacts;
use crate::pipeline::error::PipelineError;
use crate::pipeline::request::BuildRequest;
use crate::tools::{WASM2ES6JS, WASM_BINDGEN};

/// Directory, next to the compiled binary, that receives wasm-bindgen output
pub const BIND_GEN_DIR: &str = "bind_gen";

/// Opening of the companion import in ES module glue: `from './app_bg'`
const ESM_IMPORT_OPEN: &str = "from './";
/// Opening of the companion import in CommonJS glue: `require('./app_bg')`
const CJS_IMPORT_OPEN: &str = "require('./";
const CJS_IMPORT_CLOSE: &str = "')";
const ESM_IMPORT_CLOSE: &str = "'";

const ESM_BOOTED_EXPORT: &str = "export const wasmBooted = wasm.booted\n";
const CJS_BOOTED_EXPORT: &str = "module.exports.wasmBooted = wasm.booted\n";

/// Runs wasm-bindgen and shapes its glue into the module source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WasmBindgenStrategy {
    /// Flags for wasm-bindgen and the glue shape
    pub options: WasmBindgenOptions,
}

impl WasmBindgenStrategy {
    pub(super) async fn execute<FS: FileSystem, CE: CommandExecutor>(
        &self,
        ctx: &StrategyContext<'_, FS, CE>,
        artifacts: &ResolvedArtifacts,
    ) -> Result<ModuleOutput, PipelineError> {
        let wasm_file = artifacts.wasm_file()?;
        let module_dir = wasm_file.parent().unwrap_or(Path::new(""));
        let stem = wasm_file.file_stem().unwrap_or_default();

        let out_dir = module_dir.join(BIND_GEN_DIR);
        let suffixless = out_dir.join(stem);
        let working_dir = ctx.request.source_dir.as_path();

        ctx.fs
            .create_dir_all(&out_dir)
            .await
            .map_err(|e| PipelineError::io(&out_dir, e))?;

        let mut args: Vec<OsString> = vec![
            wasm_file.as_os_str().to_owned(),
            "--out-dir".into(),
            out_dir.as_os_str().to_owned(),
        ];
        if self.options.typescript {
            args.push("--typescript".into());
        }
        if self.options.nodejs {
            args.push("--nodejs".into());
        }
        if self.options.debug {
            args.push("--debug".into());
        }
        ctx.runner.run_tool(&WASM_BINDGEN, &args, working_dir).await?;

        if self.options.wasm2es6js {
            let glue_wasm = with_suffix(&suffixless, "_bg.wasm");
            let glue_js = with_suffix(&suffixless, "_bg.js");
            ctx.runner
                .run_tool(
                    &WASM2ES6JS,
                    [
                        glue_wasm.as_os_str(),
                        OsStr::new("-o"),
                        glue_js.as_os_str(),
                        OsStr::new("--base64"),
                    ],
                    working_dir,
                )
                .await?;
        }

        let source = if self.options.typescript {
            typescript_module(ctx.request, &suffixless, self.options.wasm2es6js)
        } else {
            let js_path = with_suffix(&suffixless, ".js");
            let glue = ctx
                .fs
                .read_to_string(&js_path)
                .await
                .map_err(|e| PipelineError::io(&js_path, e))?;
            route_companion_import(ctx.request, glue, &suffixless, &self.options)
        };

        Ok(ModuleOutput::source(source))
    }
}

/// TypeScript module re-exporting the generated glue
pub(crate) fn typescript_module(
    request: &BuildRequest,
    suffixless: &Path,
    wasm2es6js: bool,
) -> String {
    let tsd_request = request.module_request(&with_suffix(suffixless, ".d.ts"));
    let js_request = request.module_request(&with_suffix(suffixless, ".js"));

    let mut source = format!("\n/// <reference path={tsd_request} />\nexport * from {js_request};\n");
    if wasm2es6js {
        let wasm_request = request.module_request(&with_suffix(suffixless, "_bg.js"));
        source.push_str(&format!(
            "\nimport * as wasm from {wasm_request};\nexport const wasmBooted: Promise<boolean> = wasm.booted\n"
        ));
    }
    source
}

/// Generated JS glue with its companion import routed through the bundler
///
/// Only the first import of the `_bg` module is rewritten; the rest of the glue is
/// returned verbatim.
pub(crate) fn route_companion_import(
    request: &BuildRequest,
    mut glue: String,
    suffixless: &Path,
    options: &WasmBindgenOptions,
) -> String {
    if options.wasm2es6js {
        glue.push_str(if options.nodejs {
            CJS_BOOTED_EXPORT
        } else {
            ESM_BOOTED_EXPORT
        });
    }

    let companion = with_suffix(suffixless, "_bg");
    let companion_name = companion
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let include_request = request.module_request(&companion);

    let (literal, replacement) = if options.nodejs {
        (
            format!("{CJS_IMPORT_OPEN}{companion_name}{CJS_IMPORT_CLOSE}"),
            format!("require({include_request})"),
        )
    } else {
        (
            format!("{ESM_IMPORT_OPEN}{companion_name}{ESM_IMPORT_CLOSE}"),
            format!("from {include_request}"),
        )
    };

    if !glue.contains(&literal) {
        log::warn!("generated glue has no `{literal}` import; leaving it unchanged");
    }
    glue.replacen(&literal, &replacement, 1)
}

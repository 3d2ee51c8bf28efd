use std::path::Path;

use super::{file_name_lossy, EmittedAsset, ModuleOutput, StrategyContext};
use crate::config::CargoWebOptions;
use crate::infra::{CommandExecutor, FileSystem};
use crate::pipeline::artifacts::ResolvedArtifacts;
use crate::pipeline::error::PipelineError;
use crate::pipeline::naming::{interpolate_name, NameContext};

/// How cargo-web glue fetches its binary: `fetch( "app.wasm" )`
const FETCH_OPEN: &str = "fetch( ";
const FETCH_CLOSE: &str = " )";

/// Replacement fetch target, resolved against the bundle's public path at runtime
pub const FETCH_REPLACEMENT_PREFIX: &str = "fetch(__webpack_public_path__ + ";

/// Emits the cargo-web binary under a content-derived name and repoints the glue
#[derive(Debug, Clone)]
pub struct CargoWebStrategy {
    /// Naming options for the emitted binary
    pub options: CargoWebOptions,
}

impl CargoWebStrategy {
    pub(super) async fn execute<FS: FileSystem, CE: CommandExecutor>(
        &self,
        ctx: &StrategyContext<'_, FS, CE>,
        artifacts: &ResolvedArtifacts,
    ) -> Result<ModuleOutput, PipelineError> {
        let wasm_file = artifacts.wasm_file()?;
        let js_file = artifacts.js_file()?;

        let glue = ctx
            .fs
            .read_to_string(js_file)
            .await
            .map_err(|e| PipelineError::io(js_file, e))?;
        let wasm = ctx
            .fs
            .read(wasm_file)
            .await
            .map_err(|e| PipelineError::io(wasm_file, e))?;

        let original_name = file_name_lossy(wasm_file);
        let output_name = interpolate_name(
            &self.options.output_name_pattern,
            &NameContext {
                resource_path: &ctx.request.resource_path,
                context: &ctx.request.context,
                file_name: Path::new(&original_name),
                content: &wasm,
                reg_exp: self.options.content_hash_reg_exp.as_ref(),
            },
        );
        log::debug!("emitting {} as {}", original_name, output_name);

        let source = rewrite_glue(&glue, &original_name, &output_name);
        Ok(ModuleOutput {
            source,
            assets: vec![EmittedAsset {
                name: output_name,
                bytes: wasm,
            }],
        })
    }
}

/// Repoint cargo-web glue from `original_name` to `output_name`
///
/// `fetch( "<original>" )` becomes a public-path fetch of the new name, then every
/// remaining quoted `"<original>"` literal is renamed. Matches whose opening quote
/// is escaped sit inside a larger string literal and are skipped.
///
/// ```
/// use wasm_loader::pipeline::strategy::rewrite_glue;
///
/// let glue = r#"var file = fetch( "app.wasm" );"#;
/// assert_eq!(
///     rewrite_glue(glue, "app.wasm", "app.a1b2c3.wasm"),
///     r#"var file = fetch(__webpack_public_path__ + "app.a1b2c3.wasm");"#
/// );
/// ```
pub fn rewrite_glue(glue: &str, original_name: &str, output_name: &str) -> String {
    let original = json_string(original_name);
    let output = json_string(output_name);

    let fetched = replace_unescaped(
        glue,
        &format!("{FETCH_OPEN}{original}{FETCH_CLOSE}"),
        &format!("{FETCH_REPLACEMENT_PREFIX}{output})"),
    );
    replace_unescaped(&fetched, &original, &output)
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Replace `from` with `to` except where `from`'s first quote is backslash-escaped
fn replace_unescaped(text: &str, from: &str, to: &str) -> String {
    let quote_at = from.find('"').unwrap_or(0);
    let mut result = String::with_capacity(text.len());
    let mut last = 0;

    for (start, matched) in text.match_indices(from) {
        let escaped = text[..start + quote_at].ends_with('\\');
        if escaped {
            continue;
        }
        result.push_str(&text[last..start]);
        result.push_str(to);
        last = start + matched.len();
    }
    result.push_str(&text[last..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    // Excerpt of cargo-web 0.6 glue for a crate named `app`
    const GLUE: &str = r#"if( typeof process === "object" && typeof process.versions === "object" && typeof process.versions.node === "string" ) {
    var fs = require( "fs" );
    var path = require( "path" );
    var wasm_path = path.join( __dirname, "app.wasm" );
    var buffer = fs.readFileSync( wasm_path );
    var mod = new WebAssembly.Module( buffer );
    var wasm_instance = new WebAssembly.Instance( mod, instance.imports );
    return instance.initialize( wasm_instance );
} else {
    var file = fetch( "app.wasm", {credentials: "same-origin"} );
    var file_plain = fetch( "app.wasm" );
}"#;

    #[test]
    fn test_fetch_and_bare_literals_are_rewritten() {
        let output = rewrite_glue(GLUE, "app.wasm", "app.a1b2c3.wasm");

        assert!(output.contains(r#"var file_plain = fetch(__webpack_public_path__ + "app.a1b2c3.wasm");"#));
        assert!(output.contains(r#"path.join( __dirname, "app.a1b2c3.wasm" )"#));
        assert!(output.contains(r#"fetch( "app.a1b2c3.wasm", {credentials: "same-origin"} )"#));
        assert!(!output.contains(r#""app.wasm""#));
    }

    #[test]
    fn test_escaped_literal_inside_string_is_untouched() {
        let glue = r#"var meta = "{\"file\":\"app.wasm\"}"; var f = "app.wasm";"#;
        let output = rewrite_glue(glue, "app.wasm", "x.wasm");
        assert_eq!(
            output,
            r#"var meta = "{\"file\":\"app.wasm\"}"; var f = "x.wasm";"#
        );
    }

    #[test]
    fn test_longer_names_are_not_partial_matches() {
        let glue = r#"load("myapp.wasm"); load("app.wasm.map");"#;
        assert_eq!(rewrite_glue(glue, "app.wasm", "x.wasm"), glue);
    }

    #[test]
    fn test_replace_unescaped_without_matches_is_identity() {
        assert_eq!(replace_unescaped("abc", "\"z\"", "\"y\""), "abc");
    }
}

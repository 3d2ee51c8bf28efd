//! Output file name interpolation for emitted assets
//!
//! Supported tokens:
//! - `[name]`, `[ext]`: stem and extension of the emitted file
//! - `[path]`: resource directory relative to the context, with a trailing `/`;
//!   `..` segments become `_`
//! - `[folder]`: name of the resource's directory
//! - `[hash]`, `[contenthash]`, optionally `:N`: SHA-256 hex digest of the content
//! - `[N]`: capture group `N` of the configured pattern, matched against the resource path
//!
//! Anything else in brackets is left as written.

use regex::{Captures, Regex};
use sha2::{Digest, Sha256};
use std::path::{Component, Path};
use std::sync::OnceLock;

use super::request::relative_path;

/// Digest length used when a hash token carries no `:N`
pub const DEFAULT_HASH_LENGTH: usize = 32;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| {
        Regex::new(r"\[(?:(?:hash|contenthash)(?::(\d+))?|(name|ext|path|folder)|(\d+))\]")
            .expect("Invalid name token regex")
    })
}

/// Inputs for [`interpolate_name`]
#[derive(Debug, Clone, Copy)]
pub struct NameContext<'a> {
    /// Resource being loaded
    pub resource_path: &'a Path,
    /// Build context directory
    pub context: &'a Path,
    /// File name the asset had on disk
    pub file_name: &'a Path,
    /// Asset bytes
    pub content: &'a [u8],
    /// Pattern for `[N]` tokens
    pub reg_exp: Option<&'a Regex>,
}

/// Expand `pattern` for one asset
///
/// ```
/// use wasm_loader::pipeline::naming::{interpolate_name, NameContext};
/// use std::path::Path;
///
/// let ctx = NameContext {
///     resource_path: Path::new("/app/src/main.rs"),
///     context: Path::new("/app"),
///     file_name: Path::new("app.wasm"),
///     content: b"\0asm",
///     reg_exp: None,
/// };
/// let name = interpolate_name("[name].[hash:8].[ext]", &ctx);
/// assert!(name.starts_with("app."));
/// assert!(name.ends_with(".wasm"));
/// assert_eq!(name.len(), "app.".len() + 8 + ".wasm".len());
/// ```
pub fn interpolate_name(pattern: &str, ctx: &NameContext<'_>) -> String {
    let digest = hex::encode(Sha256::digest(ctx.content));
    let groups = ctx
        .reg_exp
        .and_then(|re| re.captures(ctx.resource_path.to_str()?));

    token_re()
        .replace_all(pattern, |caps: &Captures<'_>| {
            if let Some(field) = caps.get(2) {
                return field_value(field.as_str(), ctx);
            }
            if let Some(index) = caps.get(3) {
                return index
                    .as_str()
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| groups.as_ref()?.get(i))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| caps[0].to_string());
            }
            let length = caps
                .get(1)
                .and_then(|n| n.as_str().parse::<usize>().ok())
                .unwrap_or(DEFAULT_HASH_LENGTH)
                .min(digest.len());
            digest[..length].to_string()
        })
        .into_owned()
}

fn field_value(field: &str, ctx: &NameContext<'_>) -> String {
    let lossy = |s: Option<&std::ffi::OsStr>| {
        s.map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let resource_dir = ctx.resource_path.parent().unwrap_or(Path::new(""));

    match field {
        "name" => lossy(ctx.file_name.file_stem()),
        "ext" => lossy(ctx.file_name.extension()),
        "folder" => lossy(resource_dir.file_name()),
        "path" => {
            let relative = relative_path(ctx.context, resource_dir)
                .unwrap_or_else(|| resource_dir.to_path_buf());
            // `..` becomes `_` and roots are dropped so the name stays below the output dir
            let joined = relative
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    Component::ParentDir => Some("_".to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/");
            if joined.is_empty() {
                joined
            } else {
                format!("{joined}/")
            }
        }
        _ => String::new(),
    }
}

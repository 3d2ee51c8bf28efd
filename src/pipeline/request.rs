//! Per-build request data and bundler module requests

use std::path::{Component, Path, PathBuf};

/// Everything fixed about one build before the compiler runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Resource being loaded
    pub resource_path: PathBuf,
    /// Directory module requests are resolved against
    pub context: PathBuf,
    /// Directory holding the crate manifest
    pub source_dir: PathBuf,
}

impl BuildRequest {
    /// Module request for `path`, relative to this build's context
    pub fn module_request(&self, path: &Path) -> String {
        module_request(&self.context, path)
    }
}

/// Render `path` as a bundler module request relative to `context`
///
/// The result is a JSON string literal holding a `./` or `../` relative path with
/// forward slashes, ready to splice into generated source.
///
/// ```
/// use wasm_loader::pipeline::request::module_request;
/// use std::path::Path;
///
/// let request = module_request(
///     Path::new("/app/src"),
///     Path::new("/app/target/wasm32-unknown-unknown/debug/app.wasm"),
/// );
/// assert_eq!(request, r#""../target/wasm32-unknown-unknown/debug/app.wasm""#);
/// ```
pub fn module_request(context: &Path, path: &Path) -> String {
    let relative = relative_path(context, path)
        .map(|rel| {
            let joined = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            if joined.starts_with("../") || joined == ".." {
                joined
            } else {
                format!("./{joined}")
            }
        })
        .unwrap_or_else(|| path.to_string_lossy().replace('\\', "/"));

    serde_json::Value::String(relative).to_string()
}

/// `path` relative to `base`; `None` when they do not share a root
pub(crate) fn relative_path(base: &Path, path: &Path) -> Option<PathBuf> {
    let base: Vec<Component<'_>> = base.components().filter(|c| *c != Component::CurDir).collect();
    let target: Vec<Component<'_>> = path.components().filter(|c| *c != Component::CurDir).collect();

    fn root<'a>(components: &[Component<'a>]) -> Option<Component<'a>> {
        components
            .first()
            .copied()
            .filter(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
    }
    if root(&base) != root(&target) {
        return None;
    }

    let common = base
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..base.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }
    Some(relative)
}

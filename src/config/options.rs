//! Raw loader options as supplied by the host

use serde::{Deserialize, Serialize};

/// The options bag a host passes to the loader
///
/// Keys are camelCase, matching what bundler configurations use. Every field is
/// optional so option sets can be layered with [`LoaderOptions::merge`]. Unknown keys
/// are rejected.
///
/// # Examples
///
/// ```
/// use wasm_loader::config::LoaderOptions;
///
/// let options: LoaderOptions = serde_json::from_str(
///     r#"{ "release": true, "wasmBindgen": { "typescript": true } }"#,
/// )?;
/// assert_eq!(options.release, Some(true));
/// assert!(options.wasm_bindgen.is_some());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoaderOptions {
    /// Build with `--release`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<bool>,

    /// Run wasm-gc on raw builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gc: Option<bool>,

    /// Compilation target triple
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Build through cargo-web
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo_web: Option<Toggle<CargoWebSettings>>,

    /// Post-process with wasm-bindgen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wasm_bindgen: Option<Toggle<WasmBindgenSettings>>,
}

impl LoaderOptions {
    /// Layer `overrides` on top of `self`; any value set in `overrides` wins.
    pub fn merge(self, overrides: LoaderOptions) -> LoaderOptions {
        LoaderOptions {
            release: overrides.release.or(self.release),
            gc: overrides.gc.or(self.gc),
            target: overrides.target.or(self.target),
            cargo_web: overrides.cargo_web.or(self.cargo_web),
            wasm_bindgen: overrides.wasm_bindgen.or(self.wasm_bindgen),
        }
    }
}

/// A feature switch that is either a plain boolean or a settings object
///
/// `true` enables the feature with default settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toggle<T> {
    /// `true` / `false`
    Enabled(bool),
    /// Settings object; the feature is on
    Configured(T),
}

impl<T: Default + Clone> Toggle<T> {
    /// Settings when the feature is on, `None` when it is off
    pub fn settings(&self) -> Option<T> {
        match self {
            Self::Enabled(true) => Some(T::default()),
            Self::Enabled(false) => None,
            Self::Configured(settings) => Some(settings.clone()),
        }
    }
}

/// cargo-web settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CargoWebSettings {
    /// Output file name template for the emitted binary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Pattern matched against the resource path; groups feed `[1]`, `[2]`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_exp: Option<String>,
}

/// wasm-bindgen settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WasmBindgenSettings {
    /// Emit TypeScript definitions and a TypeScript module
    #[serde(default)]
    pub typescript: bool,

    /// Generate CommonJS glue for Node.js
    #[serde(default)]
    pub nodejs: bool,

    /// Pass `--debug` to wasm-bindgen
    #[serde(default)]
    pub debug: bool,

    /// Convert the binary to a base64 ES6 loader with wasm2es6js
    #[serde(default)]
    pub wasm2es6js: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_parses_to_defaults() {
        let options: LoaderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, LoaderOptions::default());
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = serde_json::from_str::<LoaderOptions>(r#"{ "minify": true }"#);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("minify"));
    }

    #[test]
    fn test_toggle_accepts_boolean_and_object() {
        let options: LoaderOptions = serde_json::from_str(
            r#"{ "cargoWeb": true, "wasmBindgen": { "nodejs": true, "wasm2es6js": true } }"#,
        )
        .unwrap();

        let cargo_web = options.cargo_web.unwrap().settings().unwrap();
        assert_eq!(cargo_web, CargoWebSettings::default());

        let bindgen = options.wasm_bindgen.unwrap().settings().unwrap();
        assert!(bindgen.nodejs);
        assert!(bindgen.wasm2es6js);
        assert!(!bindgen.typescript);
    }

    #[test]
    fn test_toggle_false_disables_feature() {
        let toggle: Toggle<WasmBindgenSettings> = Toggle::Enabled(false);
        assert!(toggle.settings().is_none());
    }

    #[test]
    fn test_cargo_web_settings_use_camel_case_keys() {
        let options: LoaderOptions = serde_json::from_str(
            r#"{ "cargoWeb": { "name": "[name].[hash:8].[ext]", "regExp": "src/(\\w+)" } }"#,
        )
        .unwrap();
        let settings = options.cargo_web.unwrap().settings().unwrap();
        assert_eq!(settings.name.as_deref(), Some("[name].[hash:8].[ext]"));
        assert_eq!(settings.reg_exp.as_deref(), Some(r"src/(\w+)"));
    }

    #[test]
    fn test_unknown_nested_key_is_rejected() {
        let result = serde_json::from_str::<LoaderOptions>(
            r#"{ "wasmBindgen": { "typescript": true, "es6": true } }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_prefers_overrides() {
        let base = LoaderOptions {
            release: Some(false),
            target: Some("wasm32-unknown-emscripten".to_string()),
            ..Default::default()
        };
        let overrides = LoaderOptions {
            release: Some(true),
            gc: Some(true),
            ..Default::default()
        };

        let merged = base.merge(overrides);
        assert_eq!(merged.release, Some(true));
        assert_eq!(merged.gc, Some(true));
        assert_eq!(merged.target.as_deref(), Some("wasm32-unknown-emscripten"));
    }
}

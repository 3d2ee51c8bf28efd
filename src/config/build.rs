//! Validated, immutable build configuration

use regex::Regex;
use thiserror::Error;

use super::options::LoaderOptions;

/// Target triple used when none is configured
pub const DEFAULT_TARGET: &str = "wasm32-unknown-unknown";

/// Output name template used by cargo-web builds when none is configured
pub const DEFAULT_NAME_PATTERN: &str = "[hash].[ext]";

/// Errors raised while validating loader options
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `target` was set to an empty string
    #[error("target must not be empty")]
    EmptyTarget,

    /// `cargoWeb.regExp` is not a valid regular expression
    #[error("invalid cargoWeb.regExp `{pattern}`: {source}")]
    InvalidRegExp {
        /// The rejected pattern
        pattern: String,
        #[source]
        /// Regex compiler error
        source: regex::Error,
    },
}

/// cargo-web strategy options
#[derive(Debug, Clone)]
pub struct CargoWebOptions {
    /// Template for the emitted binary's file name
    pub output_name_pattern: String,
    /// Pattern matched against the resource path for `[N]` tokens
    pub content_hash_reg_exp: Option<Regex>,
}

/// wasm-bindgen strategy options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WasmBindgenOptions {
    /// Emit a TypeScript module with a `.d.ts` reference
    pub typescript: bool,
    /// CommonJS glue
    pub nodejs: bool,
    /// Run wasm2es6js on the bindgen binary
    pub wasm2es6js: bool,
    /// Pass `--debug` to wasm-bindgen
    pub debug: bool,
}

/// Which post-processing strategy a build uses
#[derive(Debug, Clone)]
pub enum StrategyKind {
    /// Plain cargo build, binary re-exported as-is
    Raw,
    /// cargo build followed by wasm-bindgen
    WasmBindgen(WasmBindgenOptions),
    /// `cargo web build`
    CargoWeb(CargoWebOptions),
}

impl StrategyKind {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::WasmBindgen(_) => "wasm-bindgen",
            Self::CargoWeb(_) => "cargo-web",
        }
    }
}

/// Immutable configuration for one build
///
/// Built once per build from the host's [`LoaderOptions`]; exactly one strategy is
/// selected.
///
/// # Examples
///
/// ```
/// use wasm_loader::config::{BuildConfiguration, LoaderOptions};
///
/// let config = BuildConfiguration::from_options(&LoaderOptions::default())?;
/// assert_eq!(config.compile_target, "wasm32-unknown-unknown");
/// assert!(!config.release);
/// assert_eq!(config.strategy.name(), "raw");
/// # Ok::<(), wasm_loader::config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BuildConfiguration {
    /// Build with `--release`
    pub release: bool,
    /// Run wasm-gc (raw builds only)
    pub garbage_collect: bool,
    /// Target triple
    pub compile_target: String,
    /// Selected post-processing strategy
    pub strategy: StrategyKind,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self {
            release: false,
            garbage_collect: false,
            compile_target: DEFAULT_TARGET.to_string(),
            strategy: StrategyKind::Raw,
        }
    }
}

impl BuildConfiguration {
    /// Validate `options` and select the strategy.
    ///
    /// `wasmBindgen` takes precedence when both it and `cargoWeb` are enabled.
    pub fn from_options(options: &LoaderOptions) -> Result<Self, ConfigError> {
        let compile_target = match options.target.as_deref() {
            Some("") => return Err(ConfigError::EmptyTarget),
            Some(target) => target.to_string(),
            None => DEFAULT_TARGET.to_string(),
        };

        let wasm_bindgen = options.wasm_bindgen.as_ref().and_then(|t| t.settings());
        let cargo_web = options.cargo_web.as_ref().and_then(|t| t.settings());

        let strategy = match (wasm_bindgen, cargo_web) {
            (Some(bindgen), cargo_web) => {
                if cargo_web.is_some() {
                    log::warn!("both wasmBindgen and cargoWeb are enabled; using wasm-bindgen");
                }
                StrategyKind::WasmBindgen(WasmBindgenOptions {
                    typescript: bindgen.typescript,
                    nodejs: bindgen.nodejs,
                    wasm2es6js: bindgen.wasm2es6js,
                    debug: bindgen.debug,
                })
            }
            (None, Some(web)) => {
                let content_hash_reg_exp = web
                    .reg_exp
                    .map(|pattern| {
                        Regex::new(&pattern)
                            .map_err(|source| ConfigError::InvalidRegExp { pattern, source })
                    })
                    .transpose()?;
                StrategyKind::CargoWeb(CargoWebOptions {
                    output_name_pattern: web
                        .name
                        .unwrap_or_else(|| DEFAULT_NAME_PATTERN.to_string()),
                    content_hash_reg_exp,
                })
            }
            (None, None) => StrategyKind::Raw,
        };

        Ok(Self {
            release: options.release.unwrap_or(false),
            garbage_collect: options.gc.unwrap_or(false),
            compile_target,
            strategy,
        })
    }

    /// wasm-bindgen options, when that strategy is selected
    pub fn wasm_bindgen(&self) -> Option<&WasmBindgenOptions> {
        match &self.strategy {
            StrategyKind::WasmBindgen(options) => Some(options),
            _ => None,
        }
    }

    /// cargo-web options, when that strategy is selected
    pub fn cargo_web(&self) -> Option<&CargoWebOptions> {
        match &self.strategy {
            StrategyKind::CargoWeb(options) => Some(options),
            _ => None,
        }
    }
}

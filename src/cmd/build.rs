//! Build command implementation
//!
//! Runs the loader for one resource the way a bundler would, using a
//! [`CollectingHost`], then writes what the host collected to disk.

use anyhow::Result;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{
    BuildConfiguration, CargoWebSettings, ConfigLoader, LoaderOptions, Toggle, WasmBindgenSettings,
};
use crate::error::LoaderError;
use crate::fmt::{format_bytes, CHECKMARK, CROSSMARK, PACKAGE, ROCKET, WARNING};
use crate::host::{CollectingHost, LoaderHost};
use crate::infra::{FileSystem, RealFileSystem};
use crate::pipeline::Loader;

/// Arguments of the `build` command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Resource inside the crate to build (e.g. src/lib.rs)
    #[arg(value_name = "RESOURCE")]
    pub resource: PathBuf,

    /// Loader options file (.json or .toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory module requests are resolved against (defaults to the resource's)
    #[arg(long, value_name = "DIR")]
    pub context: Option<PathBuf>,

    /// Build in release mode
    #[arg(long)]
    pub release: bool,

    /// Run wasm-gc on the binary (raw builds)
    #[arg(long)]
    pub gc: bool,

    /// Compilation target triple
    #[arg(long, value_name = "TRIPLE")]
    pub target: Option<String>,

    /// Build with cargo-web
    #[arg(long)]
    pub cargo_web: bool,

    /// cargo-web output name template (implies --cargo-web)
    #[arg(long, value_name = "PATTERN")]
    pub name: Option<String>,

    /// Pattern matched against the resource path for [N] tokens (implies --cargo-web)
    #[arg(long, value_name = "REGEX")]
    pub reg_exp: Option<String>,

    /// Post-process with wasm-bindgen
    #[arg(long)]
    pub wasm_bindgen: bool,

    /// Emit a TypeScript module (implies --wasm-bindgen)
    #[arg(long)]
    pub typescript: bool,

    /// Generate CommonJS glue (implies --wasm-bindgen)
    #[arg(long)]
    pub nodejs: bool,

    /// Pass --debug to wasm-bindgen (implies --wasm-bindgen)
    #[arg(long)]
    pub debug: bool,

    /// Convert the bindgen binary with wasm2es6js (implies --wasm-bindgen)
    #[arg(long)]
    pub wasm2es6js: bool,

    /// Directory emitted assets are written to
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Write the module source here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl BuildArgs {
    /// Options set on the command line
    pub fn option_overrides(&self) -> LoaderOptions {
        let flag = |set: bool| set.then_some(true);

        let cargo_web = (self.cargo_web || self.name.is_some() || self.reg_exp.is_some()).then(|| {
            Toggle::Configured(CargoWebSettings {
                name: self.name.clone(),
                reg_exp: self.reg_exp.clone(),
            })
        });

        let wasm_bindgen = (self.wasm_bindgen
            || self.typescript
            || self.nodejs
            || self.debug
            || self.wasm2es6js)
            .then(|| {
                Toggle::Configured(WasmBindgenSettings {
                    typescript: self.typescript,
                    nodejs: self.nodejs,
                    debug: self.debug,
                    wasm2es6js: self.wasm2es6js,
                })
            });

        LoaderOptions {
            release: flag(self.release),
            gc: flag(self.gc),
            target: self.target.clone(),
            cargo_web,
            wasm_bindgen,
        }
    }

    /// Options file (if any) with command-line overrides applied, validated
    pub async fn configuration(&self) -> Result<BuildConfiguration, LoaderError> {
        let base = match &self.config {
            Some(path) => ConfigLoader::load(path).await?,
            None => LoaderOptions::default(),
        };
        let options = base.merge(self.option_overrides());

        BuildConfiguration::from_options(&options).map_err(|e| LoaderError::InvalidConfig {
            path: self
                .config
                .clone()
                .unwrap_or_else(|| PathBuf::from("<command line>")),
            reason: e.to_string(),
        })
    }
}

/// Main build command handler
///
/// # Examples
///
/// ```no_run
/// use wasm_loader::cmd::build::{cmd_build, BuildArgs};
/// use std::path::PathBuf;
///
/// # async fn run() -> anyhow::Result<()> {
/// let args = BuildArgs {
///     resource: PathBuf::from("crate/src/lib.rs"),
///     wasm_bindgen: true,
///     out_dir: PathBuf::from("dist"),
///     ..Default::default()
/// };
/// cmd_build(&args).await?;
/// # Ok(())
/// # }
/// ```
pub async fn cmd_build(args: &BuildArgs) -> Result<()> {
    let resource = tokio::fs::canonicalize(&args.resource)
        .await
        .map_err(|source| LoaderError::Io {
            context: args.resource.display().to_string(),
            source,
        })?;
    let config = args.configuration().await?;

    eprintln!(
        "{} {} {} ({})",
        ROCKET,
        style("wasm-loader").bold(),
        resource.display(),
        config.strategy.name()
    );

    let mut host = CollectingHost::new(&resource);
    if let Some(context) = &args.context {
        host = host.with_context(context);
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("building");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = Loader::new().load(&mut host, &config).await;
    spinner.finish_and_clear();
    let source = result.map_err(LoaderError::from)?;

    present_diagnostics(&host);
    write_assets(&RealFileSystem, &host, &args.out_dir).await?;
    write_module(&RealFileSystem, &source, args.output.as_deref()).await?;

    if !host.errors.is_empty() {
        return Err(LoaderError::BuildReported {
            resource: host.resource_path().to_path_buf(),
            count: host.errors.len(),
        }
        .into());
    }

    eprintln!("{} Module built", CHECKMARK);
    Ok(())
}

/// Print collected warnings and errors on stderr
fn present_diagnostics(host: &CollectingHost) {
    for warning in &host.warnings {
        eprintln!("{} {}", WARNING, style(warning.trim_end()).yellow());
    }
    for error in &host.errors {
        eprintln!("{} {}", CROSSMARK, style(error.trim_end()).red());
    }
}

/// Write emitted assets below `out_dir`
async fn write_assets<FS: FileSystem>(
    fs: &FS,
    host: &CollectingHost,
    out_dir: &Path,
) -> Result<(), LoaderError> {
    for (name, bytes) in &host.files {
        let path = out_dir.join(name);
        if let Some(parent) = path.parent() {
            fs.create_dir_all(parent)
                .await
                .map_err(|source| LoaderError::Io {
                    context: parent.display().to_string(),
                    source,
                })?;
        }
        fs.write(&path, bytes)
            .await
            .map_err(|source| LoaderError::Io {
                context: path.display().to_string(),
                source,
            })?;
        eprintln!(
            "   {} {} ({})",
            PACKAGE,
            path.display(),
            style(format_bytes(bytes.len() as u64)).dim()
        );
    }
    Ok(())
}

/// Write module source to `output`, or stdout
async fn write_module<FS: FileSystem>(
    fs: &FS,
    source: &str,
    output: Option<&Path>,
) -> Result<(), LoaderError> {
    match output {
        Some(path) => fs
            .write(path, source.as_bytes())
            .await
            .map_err(|source| LoaderError::Io {
                context: path.display().to_string(),
                source,
            }),
        None => {
            println!("{source}");
            Ok(())
        }
    }
}

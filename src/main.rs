use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use wasm_loader::cmd::{self, BuildArgs};

/// Build Rust crates to WebAssembly bundler modules
///
/// wasm-loader compiles the crate a resource belongs to, post-processes the
/// output (raw, wasm-bindgen or cargo-web) and prints the module source a
/// bundler would receive.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Disable colored output (useful for CI/CD logs)
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a resource and print its module source
    Build(BuildArgs),

    /// Check external tools and their versions
    Check {
        /// Directory to query tool versions from
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize logger (use RUST_LOG env var to control verbosity)
    env_logger::init();

    let cli = Cli::parse();

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let result = match &cli.command {
        Commands::Build(args) => cmd::cmd_build(args).await,
        Commands::Check { dir } => cmd::cmd_check(dir.as_deref()).await,
    };

    if let Err(e) = result {
        use wasm_loader::error::ErrorFormatter;
        eprintln!("{}", ErrorFormatter::format(&e));
        let exit_code = ErrorFormatter::exit_code(&e);
        process::exit(exit_code);
    }
}

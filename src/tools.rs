//! External tool catalog and detection
//!
//! Every program the loader shells out to:
//! - cargo (required)
//! - wasm-bindgen-cli (wasm-bindgen builds, `^0.2`)
//! - cargo-web (cargo-web builds, `^0.6.9`)
//! - wasm2es6js (optional, base64 ES6 loader for wasm-bindgen output)
//! - wasm-gc (optional, dead-code removal for raw builds)

use console::style;
use std::io;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

use crate::infra::{CommandExecutor, RealCommandExecutor};
use crate::pipeline::version_gate::VersionGate;
use crate::pipeline::PipelineError;

/// Errors that can occur while invoking tools. All of them are fatal.
#[derive(Error, Debug)]
pub enum ToolError {
    /// I/O error during tool execution
    #[error("I/O error running {tool}: {source}")]
    Io {
        /// Tool name
        tool: String,
        #[source]
        /// IO error source
        source: io::Error,
    },

    /// `--version` exited non-zero
    #[error("Failed to get version for {0}")]
    VersionFailed(String),

    /// Tool could not be spawned
    #[error("Required tool missing: {tool}")]
    MissingTool {
        /// Tool name
        tool: String,
        /// How to install it
        install_hint: String,
    },
}

impl ToolError {
    /// Classify a spawn failure for `tool`
    pub fn spawn_failed(tool: &Tool, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::MissingTool {
                tool: tool.name.to_string(),
                install_hint: tool.install_hint.to_string(),
            }
        } else {
            Self::Io {
                tool: tool.name.to_string(),
                source,
            }
        }
    }
}

/// Static description of an external tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tool {
    /// Human-readable name, used in messages
    pub name: &'static str,
    /// Binary name in PATH
    pub program: &'static str,
    /// Subcommand inserted before any other argument (`cargo web ...`)
    pub subcommand: Option<&'static str>,
    /// Supported semver range, if the loader gates on it
    pub required_version: Option<&'static str>,
    /// Installation instruction shown when the tool is missing
    pub install_hint: &'static str,
}

/// The Rust package manager
pub const CARGO: Tool = Tool {
    name: "cargo",
    program: "cargo",
    subcommand: None,
    required_version: None,
    install_hint: "curl --proto '=https' --tlsv1.2 -sSf https://sh.rustup.rs | sh",
};

/// wasm-bindgen CLI
pub const WASM_BINDGEN: Tool = Tool {
    name: "wasm-bindgen",
    program: "wasm-bindgen",
    subcommand: None,
    required_version: Some("^0.2"),
    install_hint: "cargo install wasm-bindgen-cli",
};

/// cargo-web, invoked as `cargo web`
pub const CARGO_WEB: Tool = Tool {
    name: "cargo-web",
    program: "cargo",
    subcommand: Some("web"),
    required_version: Some("^0.6.9"),
    install_hint: "cargo install cargo-web",
};

/// wasm2es6js, shipped with wasm-bindgen-cli
pub const WASM2ES6JS: Tool = Tool {
    name: "wasm2es6js",
    program: "wasm2es6js",
    subcommand: None,
    required_version: None,
    install_hint: "cargo install wasm-bindgen-cli",
};

/// wasm-gc
pub const WASM_GC: Tool = Tool {
    name: "wasm-gc",
    program: "wasm-gc",
    subcommand: None,
    required_version: None,
    install_hint: "cargo install wasm-gc",
};

/// Every tool the loader knows about, in reporting order
pub const ALL_TOOLS: [Tool; 5] = [CARGO, WASM_BINDGEN, CARGO_WEB, WASM2ES6JS, WASM_GC];

impl Tool {
    /// Start a command for this tool, subcommand included
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(self.program);
        if let Some(subcommand) = self.subcommand {
            cmd.arg(subcommand);
        }
        cmd
    }

    /// Check if the tool's binary is in PATH
    ///
    /// For subcommand tools this only checks the host program.
    pub fn is_installed(&self) -> bool {
        which::which(self.program).is_ok()
    }
}

/// Status of a tool check
#[derive(Debug)]
pub enum ToolStatus {
    /// Tool reported a version inside its required range (or has none)
    Available(String),
    /// Tool reported a version outside its required range
    Unsupported {
        /// Reported version
        found: String,
        /// Required range
        required: &'static str,
    },
    /// Tool runs but its version could not be determined
    InstalledButVersionUnknown,
    /// Tool binary not found
    Missing,
}

/// All tools the loader may invoke
///
/// Reports availability for the `check` command.
pub struct ToolChain<CE: CommandExecutor = RealCommandExecutor> {
    gate: VersionGate<CE>,
}

impl Default for ToolChain<RealCommandExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolChain<RealCommandExecutor> {
    /// Create a new ToolChain with real command execution
    pub fn new() -> Self {
        Self::with_executor(RealCommandExecutor)
    }
}

impl<CE: CommandExecutor> ToolChain<CE> {
    /// Create a new ToolChain with a custom command executor
    pub fn with_executor(cmd_executor: CE) -> Self {
        Self {
            gate: VersionGate::new(cmd_executor),
        }
    }

    /// Check a single tool
    pub async fn check(&self, tool: &Tool, working_dir: &Path) -> ToolStatus {
        match self.gate.check(tool, working_dir).await {
            Ok(version) => ToolStatus::Available(version.to_string()),
            Err(PipelineError::Build(crate::error::BuildError::UnsupportedVersion {
                found, ..
            })) => ToolStatus::Unsupported {
                found,
                required: tool.required_version.unwrap_or("*"),
            },
            Err(PipelineError::Tool(ToolError::MissingTool { .. })) => ToolStatus::Missing,
            Err(_) => ToolStatus::InstalledButVersionUnknown,
        }
    }

    /// Check all tools and print their status
    ///
    /// Returns the number of tools that are missing or unsupported.
    pub async fn check_all(&self, working_dir: &Path) -> usize {
        println!("\n{} Checking build tools...", crate::fmt::WRENCH);
        self.report(&ALL_TOOLS, working_dir).await
    }

    /// Print the status of each of `tools`, skipping the version query for tools
    /// absent from PATH
    async fn report(&self, tools: &[Tool], working_dir: &Path) -> usize {
        let mut problems = 0;
        for tool in tools {
            let status = if tool.is_installed() {
                self.check(tool, working_dir).await
            } else {
                ToolStatus::Missing
            };
            match status {
                ToolStatus::Available(version) => {
                    println!(
                        "   {} {} - {}",
                        style("✓").green(),
                        style(tool.name).bold(),
                        style(version).dim()
                    );
                }
                ToolStatus::InstalledButVersionUnknown => {
                    println!(
                        "   {} {} - {}",
                        style("✓").green(),
                        style(tool.name).bold(),
                        style("(version unknown)").dim()
                    );
                }
                ToolStatus::Unsupported { found, required } => {
                    problems += 1;
                    println!(
                        "   {} {} - {} {}",
                        style("✗").red(),
                        style(tool.name).bold(),
                        style(found).red(),
                        style(format!("(need {required})")).dim()
                    );
                }
                ToolStatus::Missing => {
                    problems += 1;
                    println!(
                        "   {} {} - {}",
                        style("○").yellow(),
                        style(tool.name).bold(),
                        style("NOT FOUND").yellow()
                    );
                    println!("       {}", style(tool.install_hint).dim());
                }
            }
        }

        problems
    }
}

//! Subprocess execution for the build pipeline
//!
//! Handles the compiler invocation (cargo or `cargo web`, JSON message format) and
//! the secondary tools: wasm-bindgen, wasm2es6js, wasm-gc.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Output;

use super::error::PipelineError;
use super::messages::{CargoMessage, DiagnosticLevel};
use crate::config::{BuildConfiguration, StrategyKind};
use crate::error::BuildError;
use crate::infra::{display_command, CommandExecutor};
use crate::tools::{Tool, ToolError, CARGO, CARGO_WEB};

/// A compiler command line
///
/// `cargo [web] build --target <triple> [--release] --message-format=json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerCommand {
    /// Target triple
    pub target: String,
    /// Build with `--release`
    pub release: bool,
    /// Go through the `cargo web` subcommand
    pub web: bool,
}

impl CompilerCommand {
    /// The compiler command a configuration calls for
    pub fn for_config(config: &BuildConfiguration) -> Self {
        Self {
            target: config.compile_target.clone(),
            release: config.release,
            web: matches!(config.strategy, StrategyKind::CargoWeb(_)),
        }
    }

    /// Tool that runs this command
    pub fn tool(&self) -> &'static Tool {
        if self.web {
            &CARGO_WEB
        } else {
            &CARGO
        }
    }

    /// Arguments following the program (and subcommand)
    pub fn args(&self) -> Vec<&str> {
        let mut args = vec!["build", "--target", self.target.as_str()];
        if self.release {
            args.push("--release");
        }
        args.push("--message-format=json");
        args
    }
}

/// Outcome of one compiler run
///
/// A non-zero exit is recorded, not raised: whether it is fatal depends on which
/// artifacts the run still reported.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilerInvocation {
    /// Whether the process exited zero
    pub success: bool,
    /// Exit code, when the process exited normally
    pub exit_code: Option<i32>,
    /// JSON records from stdout, in emission order
    pub messages: Vec<CargoMessage>,
    /// Captured stderr
    pub stderr: String,
    /// stdout lines that were not JSON records
    pub text: Vec<String>,
}

impl CompilerInvocation {
    /// Split captured process output into records and passthrough text
    pub fn from_output(output: &Output) -> Self {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut messages = Vec::new();
        let mut text = Vec::new();

        for line in stdout.lines() {
            match CargoMessage::parse_line(line) {
                Some(message) => messages.push(message),
                None if !line.trim().is_empty() => text.push(line.to_string()),
                None => {}
            }
        }

        Self {
            success: output.status.success(),
            exit_code: output.status.code(),
            messages,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            text,
        }
    }

    /// Rendered compiler warnings, in emission order
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.diagnostics_at(|level| level == DiagnosticLevel::Warning)
    }

    /// Diagnostic text for a failed build
    ///
    /// Error-level compiler messages, then stderr, then non-JSON stdout.
    pub fn diagnostics(&self) -> String {
        let mut parts: Vec<&str> = self.diagnostics_at(DiagnosticLevel::is_error).collect();
        let stderr = self.stderr.trim_end();
        if !stderr.is_empty() {
            parts.push(stderr);
        }
        parts.extend(self.text.iter().map(String::as_str));
        parts
            .iter()
            .map(|part| part.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn diagnostics_at(
        &self,
        filter: impl Fn(DiagnosticLevel) -> bool,
    ) -> impl Iterator<Item = &str> {
        self.messages.iter().filter_map(move |message| match message {
            CargoMessage::CompilerMessage(diag) if filter(diag.message.level) => {
                Some(diag.message.text())
            }
            _ => None,
        })
    }
}

/// Runs external processes for one build
pub struct ProcessRunner<CE: CommandExecutor> {
    cmd_executor: CE,
}

impl<CE: CommandExecutor> ProcessRunner<CE> {
    /// Create a runner that spawns through `cmd_executor`
    pub fn new(cmd_executor: CE) -> Self {
        Self { cmd_executor }
    }

    /// Run the compiler in `working_dir`
    ///
    /// Only a spawn failure is an error here.
    pub async fn run_compiler(
        &self,
        command: &CompilerCommand,
        working_dir: &Path,
    ) -> Result<CompilerInvocation, PipelineError> {
        let tool = command.tool();
        let mut cmd = tool.command();
        cmd.args(command.args()).current_dir(working_dir);
        log::info!("compiling: {}", display_command(&cmd));

        let output = self
            .cmd_executor
            .output(&mut cmd)
            .await
            .map_err(|e| ToolError::spawn_failed(tool, e))?;

        let invocation = CompilerInvocation::from_output(&output);
        log::debug!(
            "compiler exited with {:?}, {} JSON record(s)",
            invocation.exit_code,
            invocation.messages.len()
        );
        Ok(invocation)
    }

    /// Run a secondary tool in `working_dir`
    ///
    /// A non-zero exit is a recoverable [`BuildError::ToolFailed`] carrying the
    /// tool's output.
    pub async fn run_tool<I, S>(
        &self,
        tool: &Tool,
        args: I,
        working_dir: &Path,
    ) -> Result<Output, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = tool.command();
        cmd.args(args).current_dir(working_dir);
        log::info!("running: {}", display_command(&cmd));

        let output = self
            .cmd_executor
            .output(&mut cmd)
            .await
            .map_err(|e| ToolError::spawn_failed(tool, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let diagnostics = [stderr.trim_end(), stdout.trim_end()]
                .iter()
                .filter(|s| !s.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join("\n");
            return Err(BuildError::ToolFailed {
                tool: tool.name.to_string(),
                diagnostics,
            }
            .into());
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CargoWebOptions, DEFAULT_NAME_PATTERN};
    use crate::infra::mock_exit_status;
    use crate::tools::WASM_GC;
    use async_trait::async_trait;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tokio::process::Command;

    const ERROR_LINE: &str = r#"{"reason":"compiler-message","message":{"level":"error","message":"cannot find value `x`","rendered":"error[E0425]: cannot find value `x` in this scope\n"}}"#;
    const WARNING_LINE: &str = r#"{"reason":"compiler-message","message":{"level":"warning","message":"unused import","rendered":"warning: unused import: `std::fmt`\n"}}"#;

    struct MockCommandExecutor {
        exit_code: i32,
        stdout: String,
        stderr: String,
        not_found: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockCommandExecutor {
        fn new(exit_code: i32, stdout: &str, stderr: &str) -> Self {
            Self {
                exit_code,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                not_found: false,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl CommandExecutor for MockCommandExecutor {
        async fn output(&self, cmd: &mut Command) -> io::Result<Output> {
            self.calls.lock().unwrap().push(display_command(cmd));
            if self.not_found {
                return Err(io::Error::new(io::ErrorKind::NotFound, "not found"));
            }
            Ok(Output {
                status: mock_exit_status(self.exit_code),
                stdout: self.stdout.as_bytes().to_vec(),
                stderr: self.stderr.as_bytes().to_vec(),
            })
        }
    }

    #[test]
    fn test_compiler_command_for_raw_release_build() {
        let config = BuildConfiguration {
            release: true,
            ..Default::default()
        };
        let command = CompilerCommand::for_config(&config);
        assert_eq!(command.tool().name, "cargo");
        assert_eq!(
            command.args(),
            [
                "build",
                "--target",
                "wasm32-unknown-unknown",
                "--release",
                "--message-format=json"
            ]
        );
    }

    #[test]
    fn test_compiler_command_for_cargo_web_uses_subcommand() {
        let config = BuildConfiguration {
            strategy: StrategyKind::CargoWeb(CargoWebOptions {
                output_name_pattern: DEFAULT_NAME_PATTERN.to_string(),
                content_hash_reg_exp: None,
            }),
            ..Default::default()
        };
        let command = CompilerCommand::for_config(&config);
        assert!(command.web);
        assert_eq!(command.tool().subcommand, Some("web"));
        assert!(!command.args().contains(&"--release"));
    }

    #[tokio::test]
    async fn test_run_compiler_splits_json_and_text() {
        let stdout = format!("{WARNING_LINE}\nnot json at all\n{ERROR_LINE}\n");
        let executor = MockCommandExecutor::new(0, &stdout, "   Compiling app v0.1.0\n");
        let calls = Arc::clone(&executor.calls);
        let runner = ProcessRunner::new(executor);

        let command = CompilerCommand::for_config(&BuildConfiguration::default());
        let invocation = runner.run_compiler(&command, Path::new("/app")).await.unwrap();

        assert!(invocation.success);
        assert_eq!(invocation.messages.len(), 2);
        assert_eq!(invocation.text, ["not json at all"]);
        assert_eq!(
            invocation.warnings().collect::<Vec<_>>(),
            ["warning: unused import: `std::fmt`\n"]
        );
        assert_eq!(
            calls.lock().unwrap()[0],
            "cargo build --target wasm32-unknown-unknown --message-format=json"
        );
    }

    #[tokio::test]
    async fn test_run_compiler_keeps_nonzero_exit() {
        let runner = ProcessRunner::new(MockCommandExecutor::new(
            101,
            &format!("{ERROR_LINE}\n"),
            "error: could not compile `app`\n",
        ));
        let command = CompilerCommand::for_config(&BuildConfiguration::default());
        let invocation = runner.run_compiler(&command, Path::new("/app")).await.unwrap();

        assert!(!invocation.success);
        assert_eq!(invocation.exit_code, Some(101));
        let diagnostics = invocation.diagnostics();
        assert!(diagnostics.starts_with("error[E0425]"));
        assert!(diagnostics.contains("could not compile `app`"));
    }

    #[tokio::test]
    async fn test_run_compiler_missing_cargo_is_fatal() {
        let mut executor = MockCommandExecutor::new(0, "", "");
        executor.not_found = true;
        let runner = ProcessRunner::new(executor);

        let command = CompilerCommand::for_config(&BuildConfiguration::default());
        let err = runner
            .run_compiler(&command, Path::new("/app"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Tool(ToolError::MissingTool { .. })));
    }

    #[tokio::test]
    async fn test_run_tool_nonzero_exit_is_build_error() {
        let runner = ProcessRunner::new(MockCommandExecutor::new(1, "", "error: bad magic\n"));
        let err = runner
            .run_tool(&WASM_GC, ["in.wasm", "in.gc.wasm"], Path::new("/app"))
            .await
            .unwrap_err();

        match err.as_build_error() {
            Some(BuildError::ToolFailed { tool, diagnostics }) => {
                assert_eq!(tool, "wasm-gc");
                assert_eq!(diagnostics, "error: bad magic");
            }
            other => panic!("Expected ToolFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_tool_success_returns_output() {
        let executor = MockCommandExecutor::new(0, "done", "");
        let calls = Arc::clone(&executor.calls);
        let runner = ProcessRunner::new(executor);

        let output = runner
            .run_tool(&WASM_GC, ["in.wasm", "in.gc.wasm"], Path::new("/app"))
            .await
            .unwrap();
        assert_eq!(output.stdout, b"done");
        assert_eq!(*calls.lock().unwrap(), ["wasm-gc in.wasm in.gc.wasm"]);
    }
}

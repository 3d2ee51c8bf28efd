//! Tool version gating
//!
//! Runs `<tool> --version`, pulls the first `major.minor.patch` token out of the
//! free-form output and matches it against the tool's required semver range.

use regex::Regex;
use semver::{Version, VersionReq};
use std::path::Path;
use std::sync::OnceLock;

use super::error::PipelineError;
use crate::error::BuildError;
use crate::infra::CommandExecutor;
use crate::tools::{Tool, ToolError};

static VERSION_TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn version_token_re() -> &'static Regex {
    VERSION_TOKEN_RE
        .get_or_init(|| Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("Invalid version token regex"))
}

/// Extract the first `major.minor.patch` token from `text`
///
/// Pre-release and build suffixes are ignored.
///
/// ```
/// use wasm_loader::pipeline::version_gate::extract_version;
///
/// let version = extract_version("wasm-bindgen 0.2.92 (2a4a49362)").unwrap();
/// assert_eq!(version.to_string(), "0.2.92");
/// ```
pub fn extract_version(text: &str) -> Option<Version> {
    let caps = version_token_re().captures(text)?;
    let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

/// Check `version` against `required`
///
/// A range that does not parse is never satisfied.
pub fn check_version(tool: &str, version: &Version, required: &str) -> Result<(), BuildError> {
    let satisfied = VersionReq::parse(required)
        .map(|req| req.matches(version))
        .unwrap_or(false);

    if satisfied {
        Ok(())
    } else {
        Err(BuildError::UnsupportedVersion {
            tool: tool.to_string(),
            found: version.to_string(),
            required: required.to_string(),
        })
    }
}

/// Runs version checks against external tools
pub struct VersionGate<CE: CommandExecutor> {
    cmd_executor: CE,
}

impl<CE: CommandExecutor> VersionGate<CE> {
    /// Create a gate that spawns through `cmd_executor`
    pub fn new(cmd_executor: CE) -> Self {
        Self { cmd_executor }
    }

    /// Query the version `tool` reports in `working_dir`
    ///
    /// Spawn failures and a non-zero `--version` exit are fatal [`ToolError`]s;
    /// output without a version token is a recoverable [`BuildError`].
    pub async fn version(&self, tool: &Tool, working_dir: &Path) -> Result<Version, PipelineError> {
        let mut cmd = tool.command();
        cmd.arg("--version").current_dir(working_dir);

        let output = self
            .cmd_executor
            .output(&mut cmd)
            .await
            .map_err(|e| ToolError::spawn_failed(tool, e))?;

        if !output.status.success() {
            return Err(ToolError::VersionFailed(tool.name.to_string()).into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        extract_version(&stdout)
            .or_else(|| extract_version(&stderr))
            .ok_or_else(|| {
                BuildError::UnparseableVersion {
                    tool: tool.name.to_string(),
                    output: stdout.trim().to_string(),
                }
                .into()
            })
    }

    /// Query `tool`'s version and enforce its required range, if any
    pub async fn check(&self, tool: &Tool, working_dir: &Path) -> Result<Version, PipelineError> {
        let version = self.version(tool, working_dir).await?;
        log::debug!("{} reports version {}", tool.name, version);

        if let Some(required) = tool.required_version {
            check_version(tool.name, &version, required)?;
        }
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::mock_exit_status;
    use crate::tools::{CARGO, CARGO_WEB, WASM_BINDGEN};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::io;
    use std::process::Output;
    use std::sync::{Arc, Mutex};
    use tokio::process::Command;

    struct MockCommandExecutor {
        exit_code: i32,
        stdout: &'static str,
        calls: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl MockCommandExecutor {
        fn new(exit_code: i32, stdout: &'static str) -> Self {
            Self {
                exit_code,
                stdout,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl CommandExecutor for MockCommandExecutor {
        async fn output(&self, cmd: &mut Command) -> io::Result<Output> {
            let std_cmd = cmd.as_std();
            let mut call = vec![std_cmd.get_program().to_string_lossy().into_owned()];
            call.extend(std_cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
            self.calls.lock().unwrap().push(call);

            Ok(Output {
                status: mock_exit_status(self.exit_code),
                stdout: self.stdout.as_bytes().to_vec(),
                stderr: vec![],
            })
        }
    }

    #[test]
    fn test_extract_version_takes_first_token() {
        assert_eq!(
            extract_version("cargo-web 0.6.26\nrustc 1.75.0").unwrap(),
            Version::new(0, 6, 26)
        );
        assert_eq!(
            extract_version("wasm-bindgen 0.2.92-alpha.1").unwrap(),
            Version::new(0, 2, 92)
        );
        assert!(extract_version("wasm-bindgen dev").is_none());
        assert!(extract_version("1.2").is_none());
    }

    #[test]
    fn test_check_version_matches_caret_ranges() {
        assert!(check_version("wasm-bindgen", &Version::new(0, 2, 5), "^0.2").is_ok());
        assert!(check_version("cargo-web", &Version::new(0, 6, 9), "^0.6.9").is_ok());
        assert!(check_version("cargo-web", &Version::new(0, 6, 8), "^0.6.9").is_err());

        let err = check_version("wasm-bindgen", &Version::new(0, 3, 0), "^0.2").unwrap_err();
        assert_eq!(
            err.to_string(),
            "wasm-bindgen version not supported; got 0.3.0 but need ^0.2"
        );
    }

    #[test]
    fn test_check_version_with_invalid_range_fails() {
        assert!(check_version("tool", &Version::new(1, 0, 0), "not a range").is_err());
    }

    #[tokio::test]
    async fn test_check_runs_version_subcommand() {
        let executor = MockCommandExecutor::new(0, "cargo-web 0.6.26\n");
        let calls = Arc::clone(&executor.calls);
        let gate = VersionGate::new(executor);

        let version = gate.check(&CARGO_WEB, Path::new(".")).await.unwrap();
        assert_eq!(version, Version::new(0, 6, 26));
        assert_eq!(*calls.lock().unwrap(), [["cargo", "web", "--version"]]);
    }

    #[tokio::test]
    async fn test_check_mismatch_is_build_error() {
        let gate = VersionGate::new(MockCommandExecutor::new(0, "wasm-bindgen 0.3.0\n"));
        let err = gate.check(&WASM_BINDGEN, Path::new(".")).await.unwrap_err();
        assert!(matches!(
            err.as_build_error(),
            Some(BuildError::UnsupportedVersion { .. })
        ));
    }

    #[tokio::test]
    async fn test_check_unparseable_output_is_build_error() {
        let gate = VersionGate::new(MockCommandExecutor::new(0, "wasm-bindgen (dev)\n"));
        let err = gate.check(&WASM_BINDGEN, Path::new(".")).await.unwrap_err();
        assert!(matches!(
            err.as_build_error(),
            Some(BuildError::UnparseableVersion { .. })
        ));
    }

    #[tokio::test]
    async fn test_check_failing_version_command_is_fatal() {
        let gate = VersionGate::new(MockCommandExecutor::new(101, ""));
        let err = gate.check(&CARGO_WEB, Path::new(".")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Tool(ToolError::VersionFailed(_))));
    }

    #[tokio::test]
    async fn test_check_without_range_accepts_any_version() {
        let gate = VersionGate::new(MockCommandExecutor::new(0, "cargo 1.80.0 (376290515 2024-07-16)"));
        let version = gate.check(&CARGO, Path::new(".")).await.unwrap();
        assert_eq!(version.major, 1);
    }

    proptest! {
        #[test]
        fn prop_caret_zero_two_accepts_only_zero_two(minor in 0u64..10, patch in 0u64..100) {
            let version = Version::new(0, minor, patch);
            let accepted = check_version("wasm-bindgen", &version, "^0.2").is_ok();
            prop_assert_eq!(accepted, minor == 2);
        }

        #[test]
        fn prop_caret_zero_six_nine_needs_patch_nine(patch in 0u64..100) {
            let version = Version::new(0, 6, patch);
            let accepted = check_version("cargo-web", &version, "^0.6.9").is_ok();
            prop_assert_eq!(accepted, patch >= 9);
        }

        #[test]
        fn prop_extracted_version_round_trips(major in 0u64..1000, minor in 0u64..1000, patch in 0u64..1000) {
            let text = format!("tool {major}.{minor}.{patch} (abcdef)");
            prop_assert_eq!(extract_version(&text), Some(Version::new(major, minor, patch)));
        }
    }
}

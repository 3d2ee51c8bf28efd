//! Common test utilities and helpers
//!
//! This module provides shared functionality for integration tests:
//! - [`ScriptedExecutor`]: a command executor answering from a script
//! - Test fixture creation utilities (crate trees, cargo JSON lines)
//!
//! # Usage
//!
//! ```rust,no_run
//! mod common;
//! use common::ScriptedExecutor;
//!
//! let executor = ScriptedExecutor::new()
//!     .respond("wasm-bindgen --version", 0, "wasm-bindgen 0.2.92")
//!     .respond("cargo build", 0, "");
//! ```

pub mod fixtures;

use async_trait::async_trait;
use std::io;
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};
use tokio::process::Command;
use wasm_loader::infra::{display_command, CommandExecutor};

/// Create an ExitStatus with the given exit code
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

#[derive(Clone)]
enum Reply {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    NotFound,
}

/// Command executor that answers from a script
///
/// Each rule matches on a prefix of the rendered command line; the first matching
/// rule wins. Commands that match no rule fail to spawn with `NotFound`, as if the
/// program were not installed. Every command line is recorded.
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    rules: Vec<(String, Reply)>,
    calls: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` with an exit code and stdout
    pub fn respond(self, prefix: &str, code: i32, stdout: impl Into<String>) -> Self {
        self.respond_with_stderr(prefix, code, stdout, "")
    }

    /// Answer commands starting with `prefix` with exit code, stdout and stderr
    pub fn respond_with_stderr(
        mut self,
        prefix: &str,
        code: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        self.rules.push((
            prefix.to_string(),
            Reply::Exit {
                code,
                stdout: stdout.into(),
                stderr: stderr.into(),
            },
        ));
        self
    }

    /// Make commands starting with `prefix` fail to spawn
    pub fn missing(mut self, prefix: &str) -> Self {
        self.rules.push((prefix.to_string(), Reply::NotFound));
        self
    }

    /// Every command line run so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Command lines starting with `prefix`
    pub fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(prefix))
            .collect()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn output(&self, cmd: &mut Command) -> io::Result<Output> {
        let line = display_command(cmd);
        self.calls.lock().unwrap().push(line.clone());

        let reply = self
            .rules
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or(Reply::NotFound);

        match reply {
            Reply::Exit {
                code,
                stdout,
                stderr,
            } => Ok(Output {
                status: exit_status(code),
                stdout: stdout.into_bytes(),
                stderr: stderr.into_bytes(),
            }),
            Reply::NotFound => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such program: {line}"),
            )),
        }
    }
}

//! Infrastructure traits for abstracting I/O operations.
//!
//! This module provides trait abstractions for filesystem and command execution operations,
//! so every build step can run against real tools or against scripted mocks in tests.
//! Both traits are async: a build is one sequential task, and subprocesses or file
//! reads must not block other builds running on the same runtime.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Output;
use tokio::process::Command;

/// Trait for abstracting filesystem operations.
#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Read the entire contents of a file as bytes.
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Read the entire contents of a file into a string.
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write a slice of bytes to a file.
    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Create a directory and all missing parent directories.
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Whether `path` exists and is a regular file.
    async fn is_file(&self, path: &Path) -> bool;
}

/// Real filesystem implementation that delegates to `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

#[async_trait]
impl FileSystem for RealFileSystem {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }

    async fn is_file(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}

/// Trait for abstracting command execution.
///
/// Implementations receive a fully built [`Command`]; mocks can inspect it through
/// [`Command::as_std`] (program, arguments, working directory).
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute a command and return its output (stdout, stderr, status).
    ///
    /// An `Err` means the process could not be spawned at all.
    async fn output(&self, cmd: &mut Command) -> io::Result<Output>;
}

/// Real command executor that delegates to `tokio::process::Command`.
///
/// Spawned processes are left running if the calling future is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealCommandExecutor;

#[async_trait]
impl CommandExecutor for RealCommandExecutor {
    async fn output(&self, cmd: &mut Command) -> io::Result<Output> {
        log::debug!("spawning {:?}", cmd.as_std());
        cmd.output().await
    }
}

#[async_trait]
impl<T: FileSystem + ?Sized> FileSystem for &T {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        (**self).read(path).await
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        (**self).write(path, contents).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        (**self).create_dir_all(path).await
    }

    async fn is_file(&self, path: &Path) -> bool {
        (**self).is_file(path).await
    }
}

#[async_trait]
impl<T: CommandExecutor + ?Sized> CommandExecutor for &T {
    async fn output(&self, cmd: &mut Command) -> io::Result<Output> {
        (**self).output(cmd).await
    }
}

/// Render a command line for log and error messages.
pub fn display_command(cmd: &Command) -> String {
    let std_cmd = cmd.as_std();
    std::iter::once(std_cmd.get_program())
        .chain(std_cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Create an ExitStatus with the given exit code for use in test mocks.
///
/// This avoids spawning actual processes (like `Command::new("true")`) in tests.
#[cfg(all(test, unix))]
pub fn mock_exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code << 8) // Unix stores exit code in upper bits
}

#[cfg(all(test, windows))]
pub fn mock_exit_status(code: i32) -> std::process::ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    std::process::ExitStatus::from_raw(code as u32)
}

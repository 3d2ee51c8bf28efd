//! Test fixture helpers for creating crate trees and compiler output
//!
//! Provides utilities for setting up realistic crate layouts and the JSON lines
//! cargo prints with `--message-format=json`.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Smallest valid wasm module: magic number and version
pub const MINIMAL_WASM: &[u8] = b"\0asm\x01\0\0\0";

/// A crate laid out on disk
pub struct CrateFixture {
    /// Keeps the directory alive
    pub temp_dir: TempDir,
    /// Crate root (holds Cargo.toml)
    pub root: PathBuf,
    /// Crate name
    pub name: String,
}

impl CrateFixture {
    /// `src/lib.rs`
    pub fn lib_rs(&self) -> PathBuf {
        self.root.join("src").join("lib.rs")
    }

    /// `src` directory (the default module request context)
    pub fn src_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    /// Debug output directory for the default target
    pub fn out_dir(&self) -> PathBuf {
        self.root
            .join("target")
            .join("wasm32-unknown-unknown")
            .join("debug")
    }

    /// Path of the crate's wasm artifact
    pub fn wasm_path(&self) -> PathBuf {
        self.out_dir().join(format!("{}.wasm", self.name))
    }

    /// Path of the crate's js artifact (cargo-web)
    pub fn js_path(&self) -> PathBuf {
        self.out_dir().join(format!("{}.js", self.name))
    }

    /// `target/.../bind_gen/<name>`
    pub fn bind_gen_base(&self) -> PathBuf {
        self.out_dir().join("bind_gen").join(&self.name)
    }

    /// Write `contents` to `path`, creating parent directories
    pub fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }
}

/// Creates a cdylib crate named `name` with `Cargo.toml` and `src/lib.rs`
pub fn create_crate(name: &str) -> anyhow::Result<CrateFixture> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join(name);
    fs::create_dir_all(root.join("src"))?;

    fs::write(
        root.join("Cargo.toml"),
        format!(
            r#"[package]
name = "{}"
version = "0.1.0"
edition = "2021"

[lib]
crate-type = ["cdylib"]
"#,
            name
        ),
    )?;
    fs::write(
        root.join("src").join("lib.rs"),
        "#[no_mangle]\npub extern \"C\" fn add(a: i32, b: i32) -> i32 { a + b }\n",
    )?;

    Ok(CrateFixture {
        temp_dir,
        root,
        name: name.to_string(),
    })
}

/// A directory tree with a source file but no Cargo.toml anywhere inside it
pub fn create_manifestless_tree() -> anyhow::Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let src = temp_dir.path().join("loose").join("src");
    fs::create_dir_all(&src)?;
    let lib_rs = src.join("lib.rs");
    fs::write(&lib_rs, "pub fn f() {}\n")?;
    Ok((temp_dir, lib_rs))
}

/// `compiler-artifact` record listing `files`
pub fn artifact_line(files: &[&Path]) -> String {
    serde_json::json!({
        "reason": "compiler-artifact",
        "package_id": "app 0.1.0 (path+file:///work/app)",
        "target": { "kind": ["cdylib"], "name": "app" },
        "filenames": files,
        "fresh": false,
    })
    .to_string()
}

/// `compiler-message` record at `level`
pub fn diagnostic_line(level: &str, rendered: &str) -> String {
    serde_json::json!({
        "reason": "compiler-message",
        "package_id": "app 0.1.0 (path+file:///work/app)",
        "message": {
            "level": level,
            "message": rendered.lines().next().unwrap_or_default(),
            "rendered": rendered,
            "spans": [],
            "children": [],
        },
    })
    .to_string()
}

/// `build-finished` record
pub fn build_finished_line(success: bool) -> String {
    serde_json::json!({ "reason": "build-finished", "success": success }).to_string()
}

/// Join records into compiler stdout
pub fn stdout_of(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

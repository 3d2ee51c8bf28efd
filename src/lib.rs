#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! wasm-loader library
//!
//! Builds a Rust crate to WebAssembly for a JavaScript bundler: finds the crate,
//! runs `cargo` (optionally through `cargo web` or followed by `wasm-bindgen`),
//! post-processes the output and hands back module source plus any assets to emit.
//!
//! # Basic Example
//!
//! Selecting a strategy from loader options:
//!
//! ```
//! use wasm_loader::config::{BuildConfiguration, ConfigLoader};
//!
//! let options = ConfigLoader::from_json_str(
//!     r#"{ "release": true, "wasmBindgen": { "typescript": true } }"#,
//! ).unwrap();
//! let config = BuildConfiguration::from_options(&options).unwrap();
//!
//! assert!(config.release);
//! assert_eq!(config.strategy.name(), "wasm-bindgen");
//! assert!(config.wasm_bindgen().unwrap().typescript);
//! ```
//!
//! # Running a Build
//!
//! ```no_run
//! use wasm_loader::config::BuildConfiguration;
//! use wasm_loader::host::CollectingHost;
//! use wasm_loader::pipeline::Loader;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut host = CollectingHost::new("/work/app/src/lib.rs");
//! let source = Loader::new()
//!     .load(&mut host, &BuildConfiguration::default())
//!     .await?;
//!
//! for error in &host.errors {
//!     eprintln!("{error}");
//! }
//! for (name, bytes) in &host.files {
//!     println!("emit {name} ({} bytes)", bytes.len());
//! }
//! println!("{source}");
//! # Ok(())
//! # }
//! ```

/// Command handlers for CLI operations
pub mod cmd;
/// Loader options and validated build configuration
pub mod config;
/// Error types with contextual suggestions
pub mod error;
/// Shared formatting utilities
pub mod fmt;
/// Host bundler abstraction
pub mod host;
/// Infrastructure traits for filesystem and command execution
pub mod infra;
/// Build pipeline
pub mod pipeline;
/// External tool catalog and detection
pub mod tools;

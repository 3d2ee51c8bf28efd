//! Command handlers for the wasm-loader CLI
//!
//! Each submodule handles one CLI command.

pub mod build;
pub mod check;

pub use build::{cmd_build, BuildArgs};
pub use check::cmd_check;

//! Tool check command implementation

use anyhow::Result;
use console::style;
use std::env;
use std::path::Path;

use crate::fmt::{CHECKMARK, WARNING};
use crate::tools::ToolChain;

/// Report every external tool's availability and version
///
/// Versions are queried from `dir` (the current directory by default) so that
/// rustup toolchain overrides apply.
pub async fn cmd_check(dir: Option<&Path>) -> Result<()> {
    let working_dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => env::current_dir()?,
    };

    let problems = ToolChain::new().check_all(&working_dir).await;

    println!();
    if problems == 0 {
        println!("{} All tools available", CHECKMARK);
    } else {
        println!(
            "{} {} tool(s) missing or unsupported; builds that need them will fail",
            WARNING,
            style(problems).yellow().bold()
        );
    }
    Ok(())
}

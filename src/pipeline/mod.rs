//! Build pipeline
//!
//! Turns a resource inside a Rust crate into bundler module source:
//! 1. find the crate's `Cargo.toml` ([`manifest`])
//! 2. check the strategy's tool version ([`version_gate`])
//! 3. run `cargo build` or `cargo web build` with JSON messages ([`process`])
//! 4. pick the `.wasm`/`.js` outputs ([`artifacts`])
//! 5. post-process with the selected [`strategy`]
//!
//! [`Loader`] drives the stages and turns build errors into throwing modules.

pub mod artifacts;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod messages;
pub mod naming;
pub mod process;
pub mod request;
pub mod strategy;
pub mod version_gate;

pub use artifacts::{ArtifactResolver, ResolvedArtifacts};
pub use error::PipelineError;
pub use loader::{placeholder_module, Loader};
pub use manifest::{ManifestLocator, MANIFEST_FILE_NAME};
pub use messages::CargoMessage;
pub use process::{CompilerCommand, CompilerInvocation, ProcessRunner};
pub use request::{module_request, BuildRequest};
pub use strategy::{BuildStrategy, EmittedAsset, ModuleOutput};
pub use version_gate::VersionGate;

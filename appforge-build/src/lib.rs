//! # appforge-build
//!
//! The three build pipelines and the batch runner that composes them.
//!
//! - [`build_scripts`] / [`ScriptCompilerProcess`]: external script compiler
//! - [`build_styles`]: stylesheet aggregation + atomic write
//! - [`AssetMirror`] / [`copy_assets`]: asset mirroring
//! - [`run_once`]: one concurrent pass of the selected pipelines

pub mod assets;
pub mod batch;
pub mod error;
pub mod minify;
pub mod scripts;
pub mod styles;
pub mod writer;

pub use assets::{copy_assets, AssetMirror, MirrorResult};
pub use batch::{run_once, BatchReport, Disposition, FailurePolicy, Pipelines};
pub use error::BuildError;
pub use scripts::{build_scripts, ScriptCompilerProcess};
pub use styles::build_styles;

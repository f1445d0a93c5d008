//! appforge core library: configuration, domain types, path classification.
//!
//! Public API surface:
//! - [`config`]: [`BuildConfig`] and YAML loading
//! - [`classify`]: [`Classifier`], mapping raw paths to build domains
//! - [`types`]: domains, output density, failure taxonomy
//! - [`walk`]: deterministic recursive file listing
//! - [`error`]: [`ConfigError`]

pub mod classify;
pub mod config;
pub mod error;
pub mod types;
pub mod walk;

pub use classify::Classifier;
pub use config::{BuildConfig, MinifierConfig, ScriptCompilerConfig, CONFIG_FILE_NAME};
pub use error::ConfigError;
pub use types::{
    BuildFailure, BuildOutcome, ClassifiedPath, Domain, FailureKind, OutputDensity, Pipeline,
};

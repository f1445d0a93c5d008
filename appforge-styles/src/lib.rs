//! # appforge-styles
//!
//! Style aggregation: discovers every style source under the style root,
//! compiles each through a [`StyleCompiler`] with a shared import-path set,
//! and concatenates the results into one [`Stylesheet`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use appforge_core::BuildConfig;
//! use appforge_styles::{aggregate, GrassCompiler};
//!
//! fn build(config: &BuildConfig) {
//!     if let Ok(sheet) = aggregate(config, &GrassCompiler) {
//!         println!("{}", sheet.render(config.density));
//!     }
//! }
//! ```
//!
//! Writing the stylesheet to disk is the build pipeline's job
//! (`appforge-build`); this crate never touches the output tree.

pub mod aggregate;
pub mod compiler;
pub mod error;

pub use aggregate::{aggregate, discover, provenance_label, CompileUnit, Stylesheet, StylesheetEntry};
pub use compiler::{GrassCompiler, StyleCompiler};
pub use error::StyleError;

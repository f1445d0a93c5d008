//! The style-compiler seam.
//!
//! [`StyleCompiler`] is the only thing the aggregator knows about Sass. The
//! production implementation is [`GrassCompiler`]; tests substitute fakes.

use std::path::Path;

use appforge_core::OutputDensity;

use crate::aggregate::CompileUnit;
use crate::error::StyleError;

/// Compiles one style source to CSS text.
pub trait StyleCompiler: Send + Sync {
    /// Compile `unit.source`, resolving imports against `unit.import_paths`.
    ///
    /// An empty string is a valid result (e.g. a partial holding only variables).
    fn compile(&self, unit: &CompileUnit, density: OutputDensity) -> Result<String, StyleError>;
}

/// Pure-Rust Sass compiler backed by `grass`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrassCompiler;

impl StyleCompiler for GrassCompiler {
    fn compile(&self, unit: &CompileUnit, density: OutputDensity) -> Result<String, StyleError> {
        let style = match density {
            OutputDensity::Readable => grass::OutputStyle::Expanded,
            OutputDensity::Compact => grass::OutputStyle::Compressed,
        };
        let load_paths: Vec<&Path> = unit.import_paths.iter().map(|p| p.as_path()).collect();
        let options = grass::Options::default()
            .style(style)
            .load_paths(&load_paths)
            .quiet(true);

        let css = grass::from_path(&unit.source, &options).map_err(|err| StyleError::Compile {
            path: unit.source.clone(),
            message: err.to_string(),
        })?;
        Ok(css.trim_end_matches('\n').to_string())
    }
}

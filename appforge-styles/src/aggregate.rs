//! Discovery and concatenation of style sources.
//!
//! # Stylesheet layout
//!
//! Readable density, one entry per source with non-empty output:
//!
//! ```text
//! /* File: /button.scss */
//! .btn {
//!   color: red;
//! }
//! ```
//!
//! Compact density concatenates the compiled bodies with no comments and no
//! separators. Sources that compile to nothing are left out in both modes.

use std::path::{Path, PathBuf};

use appforge_core::{walk, BuildConfig, Classifier, OutputDensity};

use crate::compiler::StyleCompiler;
use crate::error::{io_err, StyleError};

/// One style source plus the directories its imports may resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileUnit {
    pub source: PathBuf,
    /// Path relative to the style root.
    pub relative: PathBuf,
    pub import_paths: Vec<PathBuf>,
}

/// A compiled source, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetEntry {
    pub relative: PathBuf,
    pub css: String,
}

/// The aggregated build artifact, before serialisation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stylesheet {
    pub entries: Vec<StylesheetEntry>,
}

impl Stylesheet {
    /// Serialise the stylesheet for the given density.
    pub fn render(&self, density: OutputDensity) -> String {
        let mut out = String::new();
        for entry in self.entries.iter().filter(|e| !e.css.is_empty()) {
            if density.is_compact() {
                out.push_str(&entry.css);
            } else {
                out.push_str(&format!(
                    "/* File: {} */\n{}\n",
                    provenance_label(&entry.relative),
                    entry.css
                ));
            }
        }
        out
    }
}

/// `/`-rooted, forward-slash form of a style-root-relative path.
pub fn provenance_label(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", parts.join("/"))
}

/// List every style source under the style root and pair it with the
/// current import-path set.
///
/// The import-path set is every distinct containing directory, first-seen
/// order, recomputed from the full listing on every call.
pub fn discover(config: &BuildConfig) -> Result<Vec<CompileUnit>, StyleError> {
    let classifier = Classifier::new(config);
    let style_root = classifier.style_root();

    let sources: Vec<PathBuf> = walk::list_files(style_root)
        .map_err(|e| io_err(style_root, e))?
        .into_iter()
        .filter(|path| classifier.is_style_extension(path))
        .collect();

    let mut import_paths: Vec<PathBuf> = Vec::new();
    for source in &sources {
        if let Some(dir) = source.parent() {
            if !import_paths.iter().any(|p| p == dir) {
                import_paths.push(dir.to_path_buf());
            }
        }
    }

    Ok(sources
        .into_iter()
        .map(|source| CompileUnit {
            relative: source
                .strip_prefix(style_root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| source.clone()),
            source,
            import_paths: import_paths.clone(),
        })
        .collect())
}

/// Discover and compile every style source. The first compile failure aborts.
pub fn aggregate(
    config: &BuildConfig,
    compiler: &dyn StyleCompiler,
) -> Result<Stylesheet, StyleError> {
    let units = discover(config)?;
    let mut entries = Vec::with_capacity(units.len());
    for unit in &units {
        let css = compiler.compile(unit, config.density)?;
        entries.push(StylesheetEntry {
            relative: unit.relative.clone(),
            css,
        });
    }
    Ok(Stylesheet { entries })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(relative: &str, css: &str) -> StylesheetEntry {
        StylesheetEntry {
            relative: PathBuf::from(relative),
            css: css.to_string(),
        }
    }

    #[test]
    fn readable_render_annotates_each_entry() {
        let sheet = Stylesheet {
            entries: vec![entry("a.scss", ".a{}"), entry("nested/b.scss", ".b{}")],
        };
        assert_eq!(
            sheet.render(OutputDensity::Readable),
            "/* File: /a.scss */\n.a{}\n/* File: /nested/b.scss */\n.b{}\n"
        );
    }

    #[test]
    fn compact_render_has_no_comments() {
        let sheet = Stylesheet {
            entries: vec![entry("a.scss", ".a{}"), entry("b.scss", ".b{}")],
        };
        assert_eq!(sheet.render(OutputDensity::Compact), ".a{}.b{}");
    }

    #[test]
    fn empty_entries_contribute_nothing() {
        let sheet = Stylesheet {
            entries: vec![entry("button.scss", ".btn{color:red}"), entry("empty.scss", "")],
        };
        assert_eq!(
            sheet.render(OutputDensity::Readable),
            "/* File: /button.scss */\n.btn{color:red}\n"
        );
        assert_eq!(sheet.render(OutputDensity::Compact), ".btn{color:red}");
    }

    #[test]
    fn provenance_label_uses_forward_slashes() {
        let relative: PathBuf = ["partials", "_vars.scss"].iter().collect();
        assert_eq!(provenance_label(&relative), "/partials/_vars.scss");
    }
}

//! Build configuration.
//!
//! A [`BuildConfig`] is constructed once at process entry and passed by
//! reference to every component. Components never read flags or the
//! environment themselves.
//!
//! # File format
//!
//! ```yaml
//! output_root: app
//! script_root: src
//! style_root: scss
//! asset_root: html          # optional; defaults to script_root
//! script_extensions: [ts, tsx, jsx]
//! style_extensions: [scss, sass]
//! stylesheet_name: styles.css
//! script_compiler:
//!   program: tsc
//!   args: []
//!   watch_args: [--watch]
//! minifier:                 # `null` disables the JS minify post-step
//!   program: uglifyjs
//!   args: [--compress, --mangle]
//! ```
//!
//! Every key is optional. Relative roots resolve against the project directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::OutputDensity;

/// Default config file name looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = "appforge.yaml";

/// How to invoke the external script compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptCompilerConfig {
    pub program: String,
    /// Arguments passed in both modes.
    pub args: Vec<String>,
    /// Extra arguments that put the compiler in its own watch mode.
    pub watch_args: Vec<String>,
}

impl Default for ScriptCompilerConfig {
    fn default() -> Self {
        Self {
            program: "tsc".to_string(),
            args: Vec::new(),
            watch_args: vec!["--watch".to_string()],
        }
    }
}

/// External JavaScript minifier, run in place on every emitted `.js` file.
///
/// Invoked as `<program> <file> <args...> -o <file>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinifierConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for MinifierConfig {
    fn default() -> Self {
        Self {
            program: "uglifyjs".to_string(),
            args: vec!["--compress".to_string(), "--mangle".to_string()],
        }
    }
}

/// Process-wide build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub output_root: PathBuf,
    pub script_root: PathBuf,
    pub style_root: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_root: Option<PathBuf>,
    pub script_extensions: Vec<String>,
    pub style_extensions: Vec<String>,
    pub stylesheet_name: String,
    pub script_compiler: ScriptCompilerConfig,
    pub minifier: Option<MinifierConfig>,
    /// Selected on the command line, never read from the file.
    #[serde(skip)]
    pub density: OutputDensity,
    /// Base the roots were resolved against. External tools run here.
    #[serde(skip)]
    pub project_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("app"),
            script_root: PathBuf::from("src"),
            style_root: PathBuf::from("scss"),
            asset_root: None,
            script_extensions: vec!["ts".into(), "tsx".into(), "jsx".into()],
            style_extensions: vec!["scss".into(), "sass".into()],
            stylesheet_name: "styles.css".to_string(),
            script_compiler: ScriptCompilerConfig::default(),
            minifier: Some(MinifierConfig::default()),
            density: OutputDensity::Readable,
            project_dir: PathBuf::from("."),
        }
    }
}

impl BuildConfig {
    /// Load the config for `project_dir`.
    ///
    /// With `explicit = Some(path)` the file must exist (`ConfigError::NotFound`
    /// otherwise). Without it, `<project_dir>/appforge.yaml` is used when
    /// present and built-in defaults when not. The result is resolved against
    /// `project_dir` and validated.
    pub fn load_at(project_dir: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => {
                let path = project_dir.join(path);
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Self::from_file(&path)?
            }
            None => {
                let path = project_dir.join(CONFIG_FILE_NAME);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        let config = config.resolve(project_dir);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        // An empty file is a valid "all defaults" config.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Join every relative root onto `base`, which becomes the project dir.
    pub fn resolve(mut self, base: &Path) -> Self {
        self.project_dir = base.to_path_buf();
        self.output_root = base.join(&self.output_root);
        self.script_root = base.join(&self.script_root);
        self.style_root = base.join(&self.style_root);
        self.asset_root = self.asset_root.map(|root| base.join(root));
        self
    }

    pub fn with_density(mut self, density: OutputDensity) -> Self {
        self.density = density;
        self
    }

    /// Root whose non-script, non-style files are mirrored.
    pub fn asset_root(&self) -> &Path {
        self.asset_root.as_deref().unwrap_or(&self.script_root)
    }

    /// Every root a watch session subscribes to, deduplicated, nested roots dropped.
    pub fn watched_roots(&self) -> Vec<PathBuf> {
        let asset_root = self.asset_root().to_path_buf();
        let mut roots: Vec<PathBuf> = Vec::new();
        for root in [&self.script_root, &self.style_root, &asset_root] {
            if roots.iter().any(|r| root.starts_with(r)) {
                continue;
            }
            roots.retain(|r| !r.starts_with(root));
            roots.push(root.clone());
        }
        roots
    }

    pub fn stylesheet_path(&self) -> PathBuf {
        self.output_root.join(&self.stylesheet_name)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.script_extensions.is_empty() && self.style_extensions.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one of script_extensions / style_extensions must be set".to_string(),
            ));
        }
        if self.stylesheet_name.trim().is_empty() {
            return Err(ConfigError::Invalid("stylesheet_name is empty".to_string()));
        }
        if self.script_compiler.program.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "script_compiler.program is empty".to_string(),
            ));
        }
        // Output inside a watched root would feed the mirror its own writes.
        let asset_root = self.asset_root().to_path_buf();
        for root in [&self.script_root, &self.style_root, &asset_root] {
            if self.output_root.starts_with(root) {
                return Err(ConfigError::Invalid(format!(
                    "output_root {} must not be inside source root {}",
                    self.output_root.display(),
                    root.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_conventional_layout() {
        let config = BuildConfig::default().resolve(Path::new("/p"));
        assert_eq!(config.output_root, PathBuf::from("/p/app"));
        assert_eq!(config.script_root, PathBuf::from("/p/src"));
        assert_eq!(config.style_root, PathBuf::from("/p/scss"));
        assert_eq!(config.asset_root(), Path::new("/p/src"));
        assert_eq!(config.stylesheet_path(), PathBuf::from("/p/app/styles.css"));
        assert_eq!(config.project_dir, PathBuf::from("/p"));
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let config = BuildConfig::load_at(dir.path(), None).expect("load");
        assert_eq!(config.script_root, dir.path().join("src"));
        assert_eq!(config.script_compiler.program, "tsc");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "asset_root: html\nminifier: null\n",
        )
        .expect("write");
        let config = BuildConfig::load_at(dir.path(), None).expect("load");
        assert_eq!(config.asset_root(), dir.path().join("html"));
        assert_eq!(config.minifier, None);
        assert_eq!(config.stylesheet_name, "styles.css");
    }

    #[test]
    fn unknown_key_is_parse_error() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "outptu_root: dist\n").expect("write");
        let err = BuildConfig::load_at(dir.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    }

    #[test]
    fn explicit_missing_file_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let err = BuildConfig::load_at(dir.path(), Some(Path::new("nope.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    }

    #[test]
    fn output_inside_source_root_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "output_root: src/out\n")
            .expect("write");
        let err = BuildConfig::load_at(dir.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got: {err}");
    }

    #[test]
    fn watched_roots_drop_nested_roots() {
        let mut config = BuildConfig::default();
        config.style_root = PathBuf::from("src/scss");
        let config = config.resolve(Path::new("/p"));
        assert_eq!(config.watched_roots(), vec![PathBuf::from("/p/src")]);

        let sibling = BuildConfig::default().resolve(Path::new("/p"));
        assert_eq!(
            sibling.watched_roots(),
            vec![PathBuf::from("/p/src"), PathBuf::from("/p/scss")]
        );
    }
}

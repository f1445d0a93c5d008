use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use appforge_core::{BuildConfig, OutputDensity};
use appforge_styles::{aggregate, discover, CompileUnit, StyleCompiler, StyleError};
use tempfile::TempDir;

/// Echoes each source's bytes as its "compiled" CSS; `!fail` fails.
#[derive(Default)]
struct EchoCompiler {
    seen: Mutex<Vec<PathBuf>>,
}

impl StyleCompiler for EchoCompiler {
    fn compile(&self, unit: &CompileUnit, _density: OutputDensity) -> Result<String, StyleError> {
        self.seen.lock().expect("lock").push(unit.relative.clone());
        let body = fs::read_to_string(&unit.source).expect("read source");
        if body.trim() == "!fail" {
            return Err(StyleError::Compile {
                path: unit.source.clone(),
                message: "forced failure".to_string(),
            });
        }
        Ok(body)
    }
}

fn project(files: &[(&str, &str)]) -> (TempDir, BuildConfig) {
    let dir = TempDir::new().expect("tempdir");
    for (path, body) in files {
        let path = dir.path().join(path);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, body).expect("write");
    }
    let config = BuildConfig::default().resolve(dir.path());
    (dir, config)
}

#[test]
fn button_and_empty_partial_scenario() {
    let (_dir, config) = project(&[
        ("scss/button.scss", ".btn{color:red}"),
        ("scss/empty.scss", ""),
    ]);
    let sheet = aggregate(&config, &EchoCompiler::default()).expect("aggregate");
    assert_eq!(
        sheet.render(OutputDensity::Readable),
        "/* File: /button.scss */\n.btn{color:red}\n"
    );
}

#[test]
fn one_comment_per_non_empty_source_in_discovery_order() {
    let (_dir, config) = project(&[
        ("scss/z.scss", ".z{}"),
        ("scss/a.scss", ".a{}"),
        ("scss/m/mid.sass", ".m{}"),
        ("scss/notes.txt", "ignored"),
    ]);
    let compiler = EchoCompiler::default();
    let rendered = aggregate(&config, &compiler)
        .expect("aggregate")
        .render(OutputDensity::Readable);

    assert_eq!(rendered.matches("/* File: ").count(), 3);
    let a = rendered.find("/a.scss").expect("a");
    let m = rendered.find("/m/mid.sass").expect("m");
    let z = rendered.find("/z.scss").expect("z");
    assert!(a < m && m < z, "discovery order broken: {rendered}");
    assert!(!rendered.contains("ignored"));
    assert_eq!(compiler.seen.lock().expect("lock").len(), 3);
}

#[test]
fn import_paths_are_every_distinct_source_dir() {
    let (dir, config) = project(&[
        ("scss/a.scss", ""),
        ("scss/b.scss", ""),
        ("scss/parts/_c.scss", ""),
        ("scss/assets/logo.png", ""),
    ]);
    let units = discover(&config).expect("discover");
    assert_eq!(units.len(), 3);
    let expected: Vec<PathBuf> = vec![dir.path().join("scss"), dir.path().join("scss/parts")];
    for unit in &units {
        assert_eq!(unit.import_paths, expected);
    }
    assert!(!units[0].import_paths.contains(&dir.path().join("scss/assets")));
}

#[test]
fn first_compile_failure_aborts() {
    let (_dir, config) = project(&[
        ("scss/a.scss", ".a{}"),
        ("scss/b.scss", "!fail"),
        ("scss/c.scss", ".c{}"),
    ]);
    let compiler = EchoCompiler::default();
    let err = aggregate(&config, &compiler).unwrap_err();
    assert!(matches!(err, StyleError::Compile { .. }), "got: {err}");
    let seen = compiler.seen.lock().expect("lock");
    assert_eq!(*seen, vec![PathBuf::from("a.scss"), PathBuf::from("b.scss")]);
}

#[test]
fn missing_style_root_is_io_error() {
    let (_dir, config) = project(&[("src/main.ts", "")]);
    let err = aggregate(&config, &EchoCompiler::default()).unwrap_err();
    assert!(matches!(err, StyleError::Io { .. }), "got: {err}");
}

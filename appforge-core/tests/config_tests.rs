//! Config loading, layout resolution, and classification over a real tree.

use std::path::PathBuf;

use appforge_core::{
    walk, BuildConfig, Classifier, ConfigError, Domain, OutputDensity, CONFIG_FILE_NAME,
};
use assert_fs::prelude::*;
use predicates::prelude::*;

// ---------------------------------------------------------------------------
// 1. Loading
// ---------------------------------------------------------------------------

#[test]
fn full_config_file_round_trips_every_field() {
    let project = assert_fs::TempDir::new().expect("tempdir");
    project
        .child(CONFIG_FILE_NAME)
        .write_str(
            "output_root: dist\n\
             script_root: client\n\
             style_root: client/styles\n\
             asset_root: static\n\
             script_extensions: [ts]\n\
             style_extensions: [scss]\n\
             stylesheet_name: bundle.css\n\
             script_compiler:\n  program: npx\n  args: [tsc, -p, .]\n  watch_args: [-w]\n\
             minifier:\n  program: terser\n  args: [-c]\n",
        )
        .expect("write config");

    let config = BuildConfig::load_at(project.path(), None).expect("load");
    assert_eq!(config.output_root, project.path().join("dist"));
    assert_eq!(config.style_root, project.path().join("client/styles"));
    assert_eq!(config.asset_root(), project.path().join("static"));
    assert_eq!(config.stylesheet_path(), project.path().join("dist/bundle.css"));
    assert_eq!(config.script_compiler.args, vec!["tsc", "-p", "."]);
    assert_eq!(config.script_compiler.watch_args, vec!["-w"]);
    assert_eq!(config.minifier.expect("minifier").program, "terser");
    assert_eq!(config.density, OutputDensity::Readable);
}

#[test]
fn corrupt_yaml_returns_parse_error_with_path() {
    let project = assert_fs::TempDir::new().expect("tempdir");
    project
        .child(CONFIG_FILE_NAME)
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = BuildConfig::load_at(project.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(predicate::str::contains(CONFIG_FILE_NAME).eval(&err.to_string()));
}

#[test]
fn empty_file_means_defaults() {
    let project = assert_fs::TempDir::new().expect("tempdir");
    project.child(CONFIG_FILE_NAME).touch().expect("touch");
    let config = BuildConfig::load_at(project.path(), None).expect("load");
    assert_eq!(config.output_root, project.path().join("app"));
}

#[test]
fn explicit_path_overrides_default_name() {
    let project = assert_fs::TempDir::new().expect("tempdir");
    project
        .child("ci.yaml")
        .write_str("stylesheet_name: ci.css\n")
        .expect("write");
    project
        .child(CONFIG_FILE_NAME)
        .write_str("stylesheet_name: local.css\n")
        .expect("write");

    let config =
        BuildConfig::load_at(project.path(), Some(&PathBuf::from("ci.yaml"))).expect("load");
    assert_eq!(config.stylesheet_name, "ci.css");
}

// ---------------------------------------------------------------------------
// 2. Classification over a listed tree
// ---------------------------------------------------------------------------

#[test]
fn every_listed_source_file_gets_exactly_one_domain() {
    let project = assert_fs::TempDir::new().expect("tempdir");
    for (path, body) in [
        ("src/main.ts", "export {}"),
        ("src/preload.js", "1"),
        ("src/index.html", "<html></html>"),
        ("src/icons/logo.svg", "<svg/>"),
        ("scss/button.scss", ".btn{}"),
        ("scss/partials/_vars.scss", "$c: red;"),
    ] {
        project.child(path).write_str(body).expect("write");
    }

    let config = BuildConfig::load_at(project.path(), None).expect("load");
    let classifier = Classifier::new(&config);

    let mut counts = [0usize; 3];
    for root in config.watched_roots() {
        for file in walk::list_files(&root).expect("list") {
            let classified = classifier.classify(&file).expect("inside a root");
            let slot = match classified.domain {
                Domain::Script => 0,
                Domain::Style => 1,
                Domain::Asset => 2,
            };
            counts[slot] += 1;
        }
    }
    assert_eq!(counts, [1, 2, 3]);
}

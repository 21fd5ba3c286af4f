use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use distpack::config::{Config, ProfileConfig};

/// Run distpack with given arguments and return (stdout, stderr, exit_code)
fn run_distpack(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_distpack"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute distpack binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn write_module(root: &Path, name: &str, contents: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Serialize a config file pointing at the fixture tree, returning its path.
fn write_config(dir: &Path, config: &Config) -> std::path::PathBuf {
    let path = dir.join("distpack.toml");
    fs::write(&path, toml::to_string(config).unwrap()).unwrap();
    path
}

#[test]
fn stdout_mode_prints_assembled_bundle() {
    let context = TempDir::new().unwrap();
    let src = context.path().join("src");
    write_module(&src, "a.js", "var a=1;");
    write_module(&src, "b.js", "var b=2;");

    let config = Config {
        src: src.clone(),
        dist: context.path().join("dist"),
        profiles: vec![ProfileConfig {
            name: "dirty".to_owned(),
            output: "lib.dev.js".to_owned(),
            minify: false,
            modules: vec!["a.js".to_owned(), "b.js".to_owned()],
        }],
        ..Config::default()
    };
    let config_path = write_config(context.path(), &config);

    let (stdout, stderr, exit_code) = run_distpack(&[
        "--profile",
        "dirty",
        "--stdout",
        "--config",
        config_path.to_str().unwrap(),
    ]);

    assert_eq!(exit_code, 0, "stderr: {stderr}");
    assert_eq!(
        stdout,
        "// FILE: a.js\n\nvar a=1;\n\n// FILE: b.js\n\nvar b=2;\n\n"
    );
    // Nothing is written in stdout mode
    assert!(!context.path().join("dist").exists());
}

#[test]
fn missing_module_fails_with_nonzero_exit() {
    let context = TempDir::new().unwrap();
    let src = context.path().join("src");
    write_module(&src, "a.js", "var a=1;");

    let config = Config {
        src: src.clone(),
        dist: context.path().join("dist"),
        profiles: vec![ProfileConfig {
            name: "dirty".to_owned(),
            output: "lib.dev.js".to_owned(),
            minify: false,
            modules: vec!["a.js".to_owned(), "gone.js".to_owned()],
        }],
        ..Config::default()
    };
    let config_path = write_config(context.path(), &config);

    let (_stdout, stderr, exit_code) = run_distpack(&[
        "--profile",
        "dirty",
        "--config",
        config_path.to_str().unwrap(),
    ]);

    assert_ne!(exit_code, 0);
    assert!(
        stderr.contains("module not found: gone.js"),
        "stderr: {stderr}"
    );
}

use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

fn shaderbits(root: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_shaderbits"))
        .env("SHADERBITS_CONFIG_DIR", root.path().join("config"))
        .env("SHADERBITS_DATA_DIR", root.path().join("data"))
        .env("SHADERBITS_CACHE_DIR", root.path().join("cache"))
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run shaderbits")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn list_prints_numbered_catalog() {
    let root = TempDir::new().unwrap();
    let output = shaderbits(&root, &["list"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert_eq!(text.lines().count(), 9);
    assert!(text.lines().next().unwrap().contains("1. Aurora"));
    assert!(text.contains("Particle galaxy system"));
}

#[test]
fn list_search_filters_and_renumbers() {
    let root = TempDir::new().unwrap();
    let output = shaderbits(&root, &["list", "--search", "3D"]);
    assert!(output.status.success());

    let lines: Vec<String> = stdout(&output).lines().map(str::to_owned).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("1. Orb"));
    assert!(lines[1].contains("2. Particles"));

    let none = shaderbits(&root, &["list", "--search", "teapot"]);
    assert!(none.status.success());
    assert!(stdout(&none).contains("No effects match 'teapot'"));
}

#[test]
fn controls_lists_defaults() {
    let root = TempDir::new().unwrap();
    let output = shaderbits(&root, &["controls", "galaxy"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.starts_with("Galaxy (galaxy) controls:"));
    assert!(text.contains("preset"));
    assert!(text.contains("Nebula|Aurora|Cosmic|Solar|Deep Space"));
}

#[test]
fn unknown_effect_fails() {
    let root = TempDir::new().unwrap();
    let output = shaderbits(&root, &["controls", "lava"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("lava"));
}

#[test]
fn where_reports_overridden_directories() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("gallery.toml"), "version = 1\n").unwrap();

    let output = shaderbits(&root, &["where"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains(&config_dir.display().to_string()));
    assert!(text.contains(&root.path().join("cache").display().to_string()));
    assert!(text.contains("(present)"));
}

#[test]
fn run_rejects_bad_config_before_opening_a_window() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("gallery.toml"),
        "version = 1\n[effects.beams]\nbeam_number = \"lots\"\n",
    )
    .unwrap();

    let output = shaderbits(&root, &["run", "beams"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("beams"), "{stderr}");
    assert!(stderr.contains("beam_number"), "{stderr}");
}

#[test]
fn run_rejects_unknown_set_key() {
    let root = TempDir::new().unwrap();
    let output = shaderbits(&root, &["run", "orb", "--set", "wobble=2"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("wobble"), "{stderr}");
}

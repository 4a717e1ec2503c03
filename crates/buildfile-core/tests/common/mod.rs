use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use lazy_static::lazy_static;
use tempfile::TempDir;

lazy_static! {
    static ref ARTIFACT_DIR: PathBuf = build_artifacts();
}

/// Builds the plugin crates once per test binary, in a target directory of
/// their own.
fn build_artifacts() -> PathBuf {
    let workspace = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
    let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("plugin-artifacts");
    let status = Command::new(env!("CARGO"))
        .current_dir(&workspace)
        .args(["build", "-p", "directory-guard", "-p", "faulty-validator", "--target-dir"])
        .arg(&target_dir)
        .status()
        .expect("failed to run cargo");
    assert!(status.success(), "building plugin artifacts failed: {status}");
    target_dir.join("debug")
}

/// Copies the built artifact of `crate_name` into `dir`, so each test owns
/// the file it touches.
pub fn artifact(dir: &TempDir, crate_name: &str) -> PathBuf {
    let file_name = format!("{}{}{}", DLL_PREFIX, crate_name.replace('-', "_"), DLL_SUFFIX);
    let path = dir.path().join(&file_name);
    fs::copy(ARTIFACT_DIR.join(&file_name), &path).unwrap();
    path
}

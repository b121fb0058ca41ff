use assert_cmd::{Command, cargo::cargo_bin_cmd};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn dirdelta_cmd(first: &Path, second: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("dirdelta");
    cmd.arg(first).arg(second);
    cmd
}

/// Two empty tree roots inside one tempdir. The TempDir must be kept
/// alive for the duration of the test.
pub fn tree_pair() -> (TempDir, PathBuf, PathBuf) {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first");
    let second = temp.path().join("second");
    fs::create_dir(&first).unwrap();
    fs::create_dir(&second).unwrap();
    (temp, first, second)
}

// Not every integration test crate populates both sides identically, so
// this helper is intentionally unused in some of them.
#[allow(dead_code)]
pub fn write_both(first: &Path, second: &Path, name: &str, content: &str) {
    fs::write(first.join(name), content).unwrap();
    fs::write(second.join(name), content).unwrap();
}

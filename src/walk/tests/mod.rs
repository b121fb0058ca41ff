use super::*;
use crate::report::ComparisonEntry;
use std::fs;
use tempfile::TempDir;

fn compare(first: &Path, second: &Path) -> ComparisonReport {
    compare_trees(first, second, &CompareOptions::default()).unwrap()
}

fn compare_with(first: &Path, second: &Path, options: &CompareOptions) -> ComparisonReport {
    compare_trees(first, second, options).unwrap()
}

fn entry_for<'a>(report: &'a ComparisonReport, path: &str) -> &'a ComparisonEntry {
    report
        .entries
        .iter()
        .find(|e| e.path == Path::new(path))
        .unwrap_or_else(|| panic!("no entry for {path} in {:?}", report.entries))
}

fn paths(report: &ComparisonReport) -> Vec<String> {
    report
        .entries
        .iter()
        .map(|e| e.path.to_string_lossy().into_owned())
        .collect()
}

/// Two fresh tree roots inside one tempdir.
fn tree_pair() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first");
    let second = temp.path().join("second");
    fs::create_dir(&first).unwrap();
    fs::create_dir(&second).unwrap();
    (temp, first, second)
}

#[cfg(unix)]
mod loops;

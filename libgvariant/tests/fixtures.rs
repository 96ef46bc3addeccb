//! Test harness for the GVariant text parser against fixture files.
//!
//! Reads every .gv file from test/gv/, parses it, and compares the `Debug`
//! rendering of the value against test/debug/<name>.txt. Also reads .nay
//! files from test/nay/ (expected to fail) and checks each error message
//! against the matching .error file.

use std::fs;
use std::path::{Path, PathBuf};

use libgvariant::parse_value;

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// All files matching `pattern` below test/, sorted.
fn fixture_files(pattern: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(pattern);
    let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .flatten()
        .collect();
    files.sort();
    files
}

/// Read a sibling expectation file: test/<subdir>/<stem>.<ext>.
fn read_expected(path: &Path, subdir: &str, ext: &str) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let expected_path = test_root().join(subdir).join(format!("{}.{}", stem, ext));
    fs::read_to_string(expected_path).ok()
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

/// Run a single .gv test file (expected to succeed).
fn run_gv_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    let value = parse_value(&content)
        .map_err(|e| format!("{}: Unexpected parse error: {}", filename, e))?;
    let actual = format!("{:?}", value);

    match read_expected(path, "debug", "txt") {
        Some(expected) if expected.trim() != actual => Err(format!(
            "{}: Output mismatch\n    expected: {}\n    actual:   {}",
            filename,
            expected.trim(),
            actual
        )),
        Some(_) => {
            println!("  {} => {}", filename, actual);
            Ok(())
        }
        None => {
            println!("  {} => {} (no expected output)", filename, actual);
            Ok(())
        }
    }
}

/// Run a single .nay test file (expected to fail with a specific error).
fn run_nay_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    let error = match parse_value(&content) {
        Ok(value) => {
            return Err(format!(
                "{}: Expected parse error, but got success: {:?}",
                filename, value
            ))
        }
        Err(e) => e.to_string(),
    };

    match read_expected(path, "nay", "error") {
        Some(expected) if expected.trim() != error => Err(format!(
            "{}: Error mismatch\n    expected: {}\n    actual:   {}",
            filename,
            expected.trim(),
            error
        )),
        Some(_) => {
            println!("  {} => error (as expected)", filename);
            Ok(())
        }
        None => {
            println!("  {} => error: {} (no .error file to compare)", filename, error);
            Ok(())
        }
    }
}

/// Run `check` over every file and fail with all mismatches listed.
fn run_all(kind: &str, files: &[PathBuf], check: fn(&Path) -> Result<(), String>) {
    assert!(!files.is_empty(), "No .{} test files found!", kind);
    println!("\nRunning {} .{} test files:", files.len(), kind);

    let errors: Vec<String> = files.iter().filter_map(|f| check(f).err()).collect();
    let failed = errors.len();
    println!("\nResults: {} passed, {} failed", files.len() - failed, failed);

    if !errors.is_empty() {
        println!("\nErrors:");
        for error in &errors {
            println!("  - {}", error);
        }
    }

    assert!(failed == 0, "{} .{} tests failed", failed, kind);
}

#[test]
fn test_all_gv_fixtures() {
    run_all("gv", &fixture_files("gv/*.gv"), run_gv_test);
}

#[test]
fn test_all_nay_fixtures() {
    run_all("nay", &fixture_files("nay/*.nay"), run_nay_test);
}

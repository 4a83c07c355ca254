//! Integration tests module for httpfile
//!
//! This module provides common utilities for the integration tests.

pub mod end_to_end_test;
pub mod request_chaining_test;

use std::fs;
use std::path::PathBuf;
use std::sync::Once;
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Initialize test environment (run once)
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Writes `content` to a `.http` file in a fresh temporary directory.
pub fn create_temp_http_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join(name);
    fs::write(&file_path, content).expect("Failed to write test file");
    (temp_dir, file_path)
}

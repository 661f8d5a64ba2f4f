//! Test utilities for xcprobe unit tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use xcprobe::test_support::{write_project, PbxprojFixture};
//!
//! #[test]
//! fn test_example() {
//!     let tmp = tempfile::TempDir::new().unwrap();
//!     let path = write_project(tmp.path(), &PbxprojFixture::watch_app());
//!     // Load `path` with ProjectDocument::load...
//! }
//! ```

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Write a fixture as `App.xcodeproj/project.pbxproj` under `dir`.
pub fn write_project(dir: &Path, fixture: &PbxprojFixture) -> PathBuf {
    let project_dir = dir.join("App.xcodeproj");
    fs::create_dir_all(&project_dir).unwrap();

    let path = project_dir.join("project.pbxproj");
    fs::write(&path, fixture.render()).unwrap();
    path
}

/// Write a file with the given leading bytes, creating parent directories.
pub fn write_bytes(dir: &Path, relative: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, bytes).unwrap();
    path
}

//! Filesystem utilities.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

/// Where project documents usually live, relative to the working directory.
pub const PROJECT_PATTERNS: &[&str] = &[
    "*.xcodeproj/project.pbxproj",
    "ios/*.xcodeproj/project.pbxproj",
];

/// Read a file to string, with nice error messages.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Read at most `len` leading bytes of a file.
///
/// Short files yield fewer bytes; that is not an error.
pub fn read_header(path: &Path, len: usize) -> io::Result<Vec<u8>> {
    let file = fs::File::open(path)?;
    let mut header = Vec::with_capacity(len);
    file.take(len as u64).read_to_end(&mut header)?;
    Ok(header)
}

/// Find files matching glob patterns relative to a base directory.
pub fn glob_files(base: &Path, patterns: &[&str]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in
            glob(&pattern_str).with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        results.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Project documents under `base` in the usual places.
pub fn find_project_documents(base: &Path) -> Result<Vec<PathBuf>> {
    glob_files(base, PROJECT_PATTERNS)
}

/// Whether a file name marks a hidden file.
pub fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.as_encoded_bytes().starts_with(b".")
}

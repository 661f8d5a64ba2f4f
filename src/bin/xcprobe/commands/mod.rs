//! Command implementations

pub mod check;
pub mod completions;
pub mod scan;
pub mod targets;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use xcprobe::util::diagnostic::suggestions;
use xcprobe::util::fs::find_project_documents;

/// Pick the project document: flag, then config, then discovery.
pub fn resolve_project(flag: Option<PathBuf>, configured: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = flag.or(configured) {
        return Ok(path);
    }

    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let mut found = find_project_documents(&cwd)?;

    match found.len() {
        0 => bail!(
            "no project.pbxproj found in {} or its ios/ directory\n\n{}",
            cwd.display(),
            suggestions::NO_PROJECT
        ),
        1 => Ok(found.remove(0)),
        _ => {
            let listed: Vec<_> = found.iter().map(|p| format!("  {}", p.display())).collect();
            bail!(
                "found {} project documents:\n{}\n\n{}",
                found.len(),
                listed.join("\n"),
                suggestions::MANY_PROJECTS
            )
        }
    }
}

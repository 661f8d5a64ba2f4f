//! Binary signature scan.
//!
//! Walks a directory tree and reports files whose leading bytes equal one
//! of a set of byte patterns. The default patterns are the two byte orders
//! of `0xD4200000` (an ARM64 `brk #0`), which the loader reports as a bad
//! Mach-O magic when a stub ends up where a binary should be.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use serde::{Serialize, Serializer};
use thiserror::Error;
use walkdir::WalkDir;

use crate::util::fs::{is_hidden, read_header};
use crate::util::shell::format_duration;

/// Patterns used when none are configured.
pub const DEFAULT_PATTERNS: &[&str] = &["d4200000", "000020d4"];

/// Error parsing a byte pattern.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatternError {
    #[error("byte pattern is empty")]
    Empty,

    #[error("byte pattern `{0}` has an odd number of hex digits")]
    OddLength(String),

    #[error("byte pattern `{pattern}` is not valid hex: {source}")]
    InvalidHex {
        pattern: String,
        #[source]
        source: hex::FromHexError,
    },
}

/// A non-empty sequence of bytes to compare file headers against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MagicPattern(Vec<u8>);

impl MagicPattern {
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `header` starts with this pattern.
    ///
    /// A header shorter than the pattern never matches.
    pub fn matches(&self, header: &[u8]) -> bool {
        header.starts_with(&self.0)
    }

    /// The built-in pattern set.
    pub fn defaults() -> Vec<MagicPattern> {
        DEFAULT_PATTERNS
            .iter()
            .filter_map(|p| p.parse().ok())
            .collect()
    }
}

impl FromStr for MagicPattern {
    type Err = PatternError;

    /// Accepts `d4200000`, `0xD4200000`, `d4 20 00 00` and `d4:20:00:00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let digits: String = trimmed
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ':')
            .collect();

        if digits.is_empty() {
            return Err(PatternError::Empty);
        }
        if digits.len() % 2 != 0 {
            return Err(PatternError::OddLength(s.to_string()));
        }

        hex::decode(&digits)
            .map(MagicPattern)
            .map_err(|source| PatternError::InvalidHex {
                pattern: s.to_string(),
                source,
            })
    }
}

impl fmt::Display for MagicPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl Serialize for MagicPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Options for the scan command.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Directory to walk
    pub root: PathBuf,

    /// Patterns to look for; must not be empty
    pub patterns: Vec<MagicPattern>,

    /// Also look at files whose name starts with `.`
    pub include_hidden: bool,

    /// Follow symbolic links
    pub follow_links: bool,
}

impl ScanOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        ScanOptions {
            root: root.into(),
            patterns: MagicPattern::defaults(),
            include_hidden: false,
            follow_links: false,
        }
    }
}

/// A file whose header matched.
#[derive(Debug, Clone, Serialize)]
pub struct ScanMatch {
    pub path: PathBuf,

    /// Leading bytes read, as hex
    pub header: String,

    pub pattern: MagicPattern,
}

/// An entry that could not be read.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    pub path: Option<PathBuf>,
    pub reason: String,
}

/// Result of a scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub patterns: Vec<MagicPattern>,
    pub matches: Vec<ScanMatch>,
    pub files_scanned: usize,
    pub skipped: Vec<SkippedEntry>,

    #[serde(skip)]
    pub duration: Duration,
}

/// Walk `options.root` and collect matching files.
///
/// `on_file` is called once per regular file visited. Unreadable entries are
/// recorded in the report and never abort the walk.
pub fn scan(options: &ScanOptions, mut on_file: impl FnMut(&Path)) -> Result<ScanReport> {
    if options.patterns.is_empty() {
        bail!("no byte patterns to scan for");
    }
    if !options.root.is_dir() {
        bail!("scan root `{}` is not a directory", options.root.display());
    }

    let start = Instant::now();
    let header_len = options.patterns.iter().map(MagicPattern::len).max().unwrap_or(0);

    let mut report = ScanReport {
        root: options.root.clone(),
        patterns: options.patterns.clone(),
        matches: Vec::new(),
        files_scanned: 0,
        skipped: Vec::new(),
        duration: Duration::ZERO,
    };

    let walker = WalkDir::new(&options.root)
        .follow_links(options.follow_links)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("skipping unreadable entry: {}", e);
                report.skipped.push(SkippedEntry {
                    path: e.path().map(Path::to_path_buf),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if !options.include_hidden && is_hidden(entry.file_name()) {
            continue;
        }

        let path = entry.path();

        // Links to files are read through even when links are not followed
        if !entry.file_type().is_file() {
            if !entry.path_is_symlink() {
                continue;
            }
            match fs::metadata(path) {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    tracing::debug!("skipping dangling link {}: {}", path.display(), e);
                    report.skipped.push(SkippedEntry {
                        path: Some(path.to_path_buf()),
                        reason: e.to_string(),
                    });
                    continue;
                }
            }
        }

        on_file(path);
        report.files_scanned += 1;

        let header = match read_header(path, header_len) {
            Ok(header) => header,
            Err(e) => {
                tracing::debug!("skipping {}: {}", path.display(), e);
                report.skipped.push(SkippedEntry {
                    path: Some(path.to_path_buf()),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if let Some(pattern) = options.patterns.iter().find(|p| p.matches(&header)) {
            tracing::debug!("{} matches {}", path.display(), pattern);
            report.matches.push(ScanMatch {
                path: path.to_path_buf(),
                header: hex::encode(&header),
                pattern: pattern.clone(),
            });
        }
    }

    report.duration = start.elapsed();
    Ok(report)
}

/// Format the scan report for display.
pub fn format_report(report: &ScanReport, verbose: bool) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    for m in &report.matches {
        writeln!(output, "MATCH: {}", m.path.display()).unwrap();
        writeln!(output, "Header: {}", m.header).unwrap();
    }

    if verbose {
        for skipped in &report.skipped {
            let path = skipped
                .path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "?".to_string());
            writeln!(output, "skipped: {} ({})", path, skipped.reason).unwrap();
        }
    }

    writeln!(
        output,
        "{} {} in {} scanned in {}, {} skipped",
        report.matches.len(),
        if report.matches.len() == 1 { "match" } else { "matches" },
        plural(report.files_scanned, "file"),
        format_duration(report.duration),
        report.skipped.len()
    )
    .unwrap();

    output
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

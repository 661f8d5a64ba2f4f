//! High-level operations.
//!
//! This module contains the implementation of xcprobe commands.

pub mod check;
pub mod scan;
pub mod targets;

pub use check::{check, check_document, CheckOptions, CheckReport, Step, StepStatus};
pub use scan::{
    scan, MagicPattern, PatternError, ScanOptions, ScanReport, DEFAULT_PATTERNS,
};
pub use targets::{format_targets, list_targets, summarize, TargetList, TargetSummary};

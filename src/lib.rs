//! xcprobe - Diagnose watchOS/iOS build configuration problems
//!
//! This crate provides the library behind the `xcprobe` command:
//! parsing `project.pbxproj` documents, resolving whether a source file is
//! compiled into a target, and scanning build products for bad binary
//! headers.

pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities for xcprobe unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a builder for realistic project documents.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{ObjectId, ProjectDocument, Record, RecordKind};
pub use crate::resolver::{Resolution, ResolveError, Resolver, SourceQuery};

//! Project document - the materialized record map of a `project.pbxproj`.
//!
//! Parsing is a single forward pass. Each record head (`<id> /* label */ = {`)
//! is located with a regex, its body is delimited by brace matching, and the
//! scan resumes after the closing brace. Dictionaries nested inside a record
//! are therefore never mistaken for records of their own.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use super::record::{
    BuildFile, FileReference, NativeTarget, Record, RecordBody, RecordKind, SourcesBuildPhase,
};
use super::ObjectId;
use crate::util::fs::read_to_string;

static RECORD_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([0-9A-Fa-f]{24})[ \t]*(?:/\*[ \t]*([^\n]*?)[ \t]*\*/)?[ \t]*=[ \t]*\{").unwrap()
});

static SCALAR_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:^|[\s;{])([A-Za-z_][A-Za-z0-9_]*)\s*=\s*("(?:[^"\\]|\\.)*"|[^;\s(){}"]+)\s*(?:/\*[^\n]*?\*/\s*)?;"#,
    )
    .unwrap()
});

static LIST_HEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s;{])([A-Za-z_][A-Za-z0-9_]*)\s*=\s*\(").unwrap());

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

/// A parsed project document.
#[derive(Debug, Clone, Default)]
pub struct ProjectDocument {
    /// Where the document was loaded from
    path: Option<PathBuf>,

    /// Records in document order
    records: Vec<Record>,

    /// Id -> position in `records`
    index: HashMap<ObjectId, usize>,

    /// Records whose `isa` is not one of the materialized kinds
    skipped: usize,

    /// Ids seen more than once (first record kept)
    duplicates: Vec<ObjectId>,

    /// The pass stopped at a record without a closing brace
    truncated: bool,
}

impl ProjectDocument {
    /// Read and parse a project document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_to_string(path)
            .with_context(|| format!("could not open project document {}", path.display()))?;

        let mut doc = Self::parse(&content);
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    /// Parse document text. Never fails; unreadable regions are skipped.
    pub fn parse(content: &str) -> Self {
        let mut doc = ProjectDocument::default();
        let mut pos = 0;

        while let Some(caps) = RECORD_HEAD.captures_at(content, pos) {
            let Some(head) = caps.get(0) else { break };
            let open_at = head.end() - 1;

            let Some(close_at) = find_closing(content, open_at, b'{', b'}') else {
                tracing::warn!(
                    "record {} is never closed; ignoring the rest of the document",
                    &caps[1]
                );
                doc.truncated = true;
                break;
            };
            pos = close_at + 1;

            let Some(id) = ObjectId::parse(&caps[1]) else {
                continue;
            };
            let label = caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty());

            match parse_body(&content[open_at + 1..close_at], label.as_deref()) {
                Some(body) => doc.insert(Record { id, label, body }),
                None => doc.skipped += 1,
            }
        }

        tracing::debug!(
            "parsed {} records ({} of other kinds skipped)",
            doc.records.len(),
            doc.skipped
        );
        doc
    }

    fn insert(&mut self, record: Record) {
        if self.index.contains_key(&record.id) {
            tracing::warn!("duplicate object id {}; keeping the first record", record.id);
            self.duplicates.push(record.id);
            return;
        }
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
    }

    /// Path the document was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Look up a record by id.
    pub fn get(&self, id: &ObjectId) -> Option<&Record> {
        self.index.get(id).map(|&i| &self.records[i])
    }

    /// All materialized records in document order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Records of one kind in document order.
    pub fn of_kind(&self, kind: RecordKind) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(move |r| r.kind() == kind)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of records of other kinds that were skipped.
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    /// Resolve a build file id to the name of the file it compiles.
    pub fn build_file_name(&self, build_file: &ObjectId) -> Option<&str> {
        let record = self.get(build_file)?;
        let file_ref = record.as_build_file()?.file_ref.as_ref()?;
        self.get(file_ref)
            .and_then(Record::as_file_reference)
            .map(|r| r.name.as_str())
    }

    /// Check the cross-reference invariants the lookup relies on.
    ///
    /// Violations are reported, never repaired.
    pub fn integrity_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for id in &self.duplicates {
            warnings.push(format!("duplicate object id {}; the first record was kept", id));
        }
        if self.truncated {
            warnings.push("document ends inside a record; later records were not read".into());
        }

        for record in &self.records {
            match &record.body {
                RecordBody::BuildFile(BuildFile {
                    file_ref: Some(file_ref),
                }) => {
                    let resolves = self
                        .get(file_ref)
                        .map(|r| r.kind() == RecordKind::FileReference)
                        .unwrap_or(false);
                    if !resolves {
                        warnings.push(format!(
                            "build file {} ({}) references {}, which is not a file reference",
                            record.id,
                            record.display_name(),
                            file_ref
                        ));
                    }
                }
                RecordBody::NativeTarget(target) => {
                    let sources = target
                        .build_phases
                        .iter()
                        .filter(|id| self.is_kind(id, RecordKind::SourcesBuildPhase))
                        .count();
                    if sources > 1 {
                        warnings.push(format!(
                            "target {} ({}) lists {} sources build phases",
                            record.id,
                            record.display_name(),
                            sources
                        ));
                    }
                }
                RecordBody::SourcesBuildPhase(phase) => {
                    for file in &phase.files {
                        if !self.is_kind(file, RecordKind::BuildFile) {
                            warnings.push(format!(
                                "sources phase {} lists {}, which is not a build file",
                                record.id, file
                            ));
                        }
                    }
                }
                _ => {}
            }
        }

        warnings
    }

    fn is_kind(&self, id: &ObjectId, kind: RecordKind) -> bool {
        self.get(id).map(|r| r.kind() == kind).unwrap_or(false)
    }
}

fn parse_body(body: &str, label: Option<&str>) -> Option<RecordBody> {
    let isa = scalar_field(body, "isa")?;
    let kind = RecordKind::from_isa(&isa)?;

    let body = match kind {
        RecordKind::FileReference => {
            let path = scalar_field(body, "path");
            let name = scalar_field(body, "name")
                .or_else(|| {
                    path.as_deref()
                        .and_then(|p| p.rsplit('/').next())
                        .map(str::to_string)
                })
                .or_else(|| label.map(str::to_string))
                .unwrap_or_default();
            RecordBody::FileReference(FileReference { name, path })
        }
        RecordKind::BuildFile => RecordBody::BuildFile(BuildFile {
            file_ref: scalar_field(body, "fileRef").and_then(|v| ObjectId::parse(&v)),
        }),
        RecordKind::NativeTarget => RecordBody::NativeTarget(NativeTarget {
            name: scalar_field(body, "name"),
            product_name: scalar_field(body, "productName"),
            build_phases: list_field(body, "buildPhases"),
        }),
        RecordKind::SourcesBuildPhase => RecordBody::SourcesBuildPhase(SourcesBuildPhase {
            files: list_field(body, "files"),
        }),
    };
    Some(body)
}

/// First `key = value;` in the body, unquoted.
fn scalar_field(body: &str, key: &str) -> Option<String> {
    SCALAR_FIELD
        .captures_iter(body)
        .find(|caps| &caps[1] == key)
        .map(|caps| unquote(&caps[2]))
}

/// Ids listed in `key = ( ... );`. Entries that are not ids are dropped.
fn list_field(body: &str, key: &str) -> Vec<ObjectId> {
    for caps in LIST_HEAD.captures_iter(body) {
        if &caps[1] != key {
            continue;
        }
        let Some(head) = caps.get(0) else { continue };
        let open_at = head.end() - 1;
        let Some(close_at) = find_closing(body, open_at, b'(', b')') else {
            return Vec::new();
        };

        let inner = COMMENT.replace_all(&body[open_at + 1..close_at], " ");
        return inner
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .filter_map(|item| {
                let id = ObjectId::parse(&unquote(item));
                if id.is_none() {
                    tracing::debug!("ignoring non-id entry `{}` in {}", item, key);
                }
                id
            })
            .collect();
    }
    Vec::new()
}

/// Find the delimiter closing the one at `open_at`, skipping quoted strings
/// and block comments.
fn find_closing(text: &str, open_at: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open_at;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = text[i + 2..].find("*/")?;
                i += 2 + end + 1;
            }
            b if b == open => depth += 1,
            b if b == close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

//! Typed pbxproj records.
//!
//! Only the four record kinds the source-membership lookup needs are
//! materialized. Everything else in a project document is skipped by the
//! parser.

use std::fmt;

use serde::Serialize;

use super::ObjectId;

/// The kind of a record, as named by its `isa` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    FileReference,
    BuildFile,
    NativeTarget,
    SourcesBuildPhase,
}

impl RecordKind {
    /// The `isa` value that introduces this kind in a project document.
    pub fn isa(&self) -> &'static str {
        match self {
            RecordKind::FileReference => "PBXFileReference",
            RecordKind::BuildFile => "PBXBuildFile",
            RecordKind::NativeTarget => "PBXNativeTarget",
            RecordKind::SourcesBuildPhase => "PBXSourcesBuildPhase",
        }
    }

    /// Map an `isa` value back to a kind.
    pub fn from_isa(isa: &str) -> Option<Self> {
        match isa {
            "PBXFileReference" => Some(RecordKind::FileReference),
            "PBXBuildFile" => Some(RecordKind::BuildFile),
            "PBXNativeTarget" => Some(RecordKind::NativeTarget),
            "PBXSourcesBuildPhase" => Some(RecordKind::SourcesBuildPhase),
            _ => None,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.isa())
    }
}

/// A file known to the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReference {
    /// Display name (`name`, else last component of `path`, else the label)
    pub name: String,

    /// Path relative to the reference's source tree
    pub path: Option<String>,
}

/// Inclusion of a file in some build phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFile {
    /// The referenced file. Package products carry `productRef` instead.
    pub file_ref: Option<ObjectId>,
}

/// A buildable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeTarget {
    pub name: Option<String>,
    pub product_name: Option<String>,
    pub build_phases: Vec<ObjectId>,
}

/// The phase that compiles sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcesBuildPhase {
    pub files: Vec<ObjectId>,
}

/// Kind-specific fields of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "isa")]
pub enum RecordBody {
    #[serde(rename = "PBXFileReference")]
    FileReference(FileReference),
    #[serde(rename = "PBXBuildFile")]
    BuildFile(BuildFile),
    #[serde(rename = "PBXNativeTarget")]
    NativeTarget(NativeTarget),
    #[serde(rename = "PBXSourcesBuildPhase")]
    SourcesBuildPhase(SourcesBuildPhase),
}

/// One record of a project document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub id: ObjectId,

    /// The `/* ... */` comment written after the id
    pub label: Option<String>,

    #[serde(flatten)]
    pub body: RecordBody,
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self.body {
            RecordBody::FileReference(_) => RecordKind::FileReference,
            RecordBody::BuildFile(_) => RecordKind::BuildFile,
            RecordBody::NativeTarget(_) => RecordKind::NativeTarget,
            RecordBody::SourcesBuildPhase(_) => RecordKind::SourcesBuildPhase,
        }
    }

    /// Label if present, else the id.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(self.id.as_str())
    }

    pub fn as_file_reference(&self) -> Option<&FileReference> {
        match &self.body {
            RecordBody::FileReference(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_build_file(&self) -> Option<&BuildFile> {
        match &self.body {
            RecordBody::BuildFile(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_native_target(&self) -> Option<&NativeTarget> {
        match &self.body {
            RecordBody::NativeTarget(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_sources_phase(&self) -> Option<&SourcesBuildPhase> {
        match &self.body {
            RecordBody::SourcesBuildPhase(r) => Some(r),
            _ => None,
        }
    }

    /// Whether this record names the given file.
    ///
    /// A file reference matches on its label, name or path. A build file
    /// matches on its label with the trailing ` in <Phase>` removed.
    pub fn names_file(&self, file: &str) -> bool {
        match &self.body {
            RecordBody::FileReference(r) => {
                self.label.as_deref() == Some(file)
                    || r.name == file
                    || r.path.as_deref() == Some(file)
            }
            RecordBody::BuildFile(_) => self
                .label
                .as_deref()
                .map(|label| build_file_subject(label) == file)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Whether this record is the named target.
    pub fn names_target(&self, target: &str) -> bool {
        match &self.body {
            RecordBody::NativeTarget(t) => {
                self.label.as_deref() == Some(target)
                    || t.name.as_deref() == Some(target)
                    || t.product_name.as_deref() == Some(target)
            }
            _ => false,
        }
    }
}

/// Strip the ` in <Phase>` suffix Xcode writes into build file labels.
pub fn build_file_subject(label: &str) -> &str {
    match label.rsplit_once(" in ") {
        Some((subject, _phase)) => subject,
        None => label,
    }
}

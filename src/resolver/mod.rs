//! Source-membership resolution.
//!
//! Answers "is this file compiled into this target?" by following the
//! reference chain of a parsed project document:
//!
//! 1. FileReference named after the file
//! 2. BuildFile pointing at that reference
//! 3. NativeTarget named after the target
//! 4. the target's SourcesBuildPhase, and the BuildFile's place in it
//!
//! The resolver is pure: all I/O happens before a document reaches it.

pub mod errors;

pub use errors::ResolveError;

use serde::Serialize;

use crate::core::record::build_file_subject;
use crate::core::{ObjectId, ProjectDocument, Record, RecordKind};

/// The file and target a lookup is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceQuery {
    pub file: String,
    pub target: String,
}

impl SourceQuery {
    pub fn new(file: impl Into<String>, target: impl Into<String>) -> Self {
        SourceQuery {
            file: file.into(),
            target: target.into(),
        }
    }
}

/// Ids resolved at every step of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub file_ref: ObjectId,
    pub build_file: ObjectId,
    pub target: ObjectId,
    pub sources_phase: ObjectId,
}

/// A build file together with the file reference it points at.
#[derive(Debug, Clone, Copy)]
pub struct LinkedBuildFile<'a> {
    pub build_file: &'a Record,
    pub file_ref: &'a Record,
}

/// Resolver over one document.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    doc: &'a ProjectDocument,
}

impl<'a> Resolver<'a> {
    pub fn new(doc: &'a ProjectDocument) -> Self {
        Resolver { doc }
    }

    /// Step 1: file references naming `file`, in document order.
    pub fn file_references(&self, file: &str) -> Result<Vec<&'a Record>, ResolveError> {
        let doc: &'a ProjectDocument = self.doc;
        let found: Vec<_> = doc
            .of_kind(RecordKind::FileReference)
            .filter(|r| r.names_file(file))
            .collect();

        if found.is_empty() {
            let candidates = doc
                .of_kind(RecordKind::FileReference)
                .filter_map(Record::as_file_reference)
                .filter(|r| r.name.eq_ignore_ascii_case(file))
                .map(|r| r.name.clone())
                .collect();
            return Err(not_found(RecordKind::FileReference, file, candidates));
        }

        Ok(found)
    }

    /// Step 2: build files referencing one of `file_refs`.
    ///
    /// A build file's label must name the queried file or the reference it
    /// points at, so a file looked up by path still finds its build files.
    /// A build file without a label is accepted on the reference alone.
    pub fn build_files(
        &self,
        file: &str,
        file_refs: &[&'a Record],
    ) -> Result<Vec<LinkedBuildFile<'a>>, ResolveError> {
        let doc: &'a ProjectDocument = self.doc;
        let mut linked = Vec::new();

        for record in doc.of_kind(RecordKind::BuildFile) {
            let Some(target_ref) = record.as_build_file().and_then(|b| b.file_ref.as_ref()) else {
                continue;
            };
            let Some(&file_ref) = file_refs.iter().find(|r| &r.id == target_ref) else {
                continue;
            };
            if !labels_match(record, file_ref, file) {
                tracing::debug!(
                    "build file {} references {} but is labelled `{}`",
                    record.id,
                    target_ref,
                    record.display_name()
                );
                continue;
            }
            linked.push(LinkedBuildFile {
                build_file: record,
                file_ref,
            });
        }

        if linked.is_empty() {
            return Err(not_found(RecordKind::BuildFile, file, Vec::new()));
        }

        Ok(linked)
    }

    /// Step 3: the first native target named `target`.
    pub fn native_target(&self, target: &str) -> Result<&'a Record, ResolveError> {
        let doc: &'a ProjectDocument = self.doc;
        let mut matches = doc
            .of_kind(RecordKind::NativeTarget)
            .filter(|r| r.names_target(target));

        let Some(found) = matches.next() else {
            let candidates = doc
                .of_kind(RecordKind::NativeTarget)
                .map(|r| r.display_name().to_string())
                .collect();
            return Err(not_found(RecordKind::NativeTarget, target, candidates));
        };

        if let Some(other) = matches.next() {
            tracing::warn!(
                "more than one target is named `{}`; using {} and ignoring {}",
                target,
                found.id,
                other.id
            );
        }

        Ok(found)
    }

    /// Step 4a: the sources build phase listed by `target`.
    pub fn sources_phase(&self, target: &'a Record) -> Result<&'a Record, ResolveError> {
        let doc: &'a ProjectDocument = self.doc;
        let build_phases = target
            .as_native_target()
            .map(|t| t.build_phases.as_slice())
            .unwrap_or_default();

        build_phases
            .iter()
            .filter_map(|id| doc.get(id))
            .find(|r| r.kind() == RecordKind::SourcesBuildPhase)
            .ok_or_else(|| ResolveError::MissingSourcesPhase {
                target: target.display_name().to_string(),
                target_id: target.id.clone(),
                build_phases: build_phases.to_vec(),
            })
    }

    /// Step 4b: the first entry of `phase` that is one of `linked`.
    pub fn membership<'l>(
        &self,
        query: &SourceQuery,
        phase: &'a Record,
        linked: &'l [LinkedBuildFile<'a>],
    ) -> Result<&'l LinkedBuildFile<'a>, ResolveError> {
        let files = phase
            .as_sources_phase()
            .map(|p| p.files.as_slice())
            .unwrap_or_default();

        files
            .iter()
            .find_map(|id| linked.iter().find(|l| &l.build_file.id == id))
            .ok_or_else(|| ResolveError::NotMember {
                file: query.file.clone(),
                target: query.target.clone(),
                phase_id: phase.id.clone(),
                build_files: linked.iter().map(|l| l.build_file.id.clone()).collect(),
            })
    }

    /// Run all steps, stopping at the first failure.
    pub fn resolve(&self, query: &SourceQuery) -> Result<Resolution, ResolveError> {
        let file_refs = self.file_references(&query.file)?;
        let linked = self.build_files(&query.file, &file_refs)?;
        let target = self.native_target(&query.target)?;
        let phase = self.sources_phase(target)?;
        let member = self.membership(query, phase, &linked)?;

        Ok(Resolution {
            file_ref: member.file_ref.id.clone(),
            build_file: member.build_file.id.clone(),
            target: target.id.clone(),
            sources_phase: phase.id.clone(),
        })
    }
}

fn labels_match(build_file: &Record, file_ref: &Record, file: &str) -> bool {
    let Some(label) = build_file.label.as_deref() else {
        return true;
    };
    let subject = build_file_subject(label);
    subject == file
        || file_ref.label.as_deref() == Some(subject)
        || file_ref
            .as_file_reference()
            .map(|r| r.name == subject)
            .unwrap_or(false)
}

fn not_found(kind: RecordKind, name: &str, candidates: Vec<String>) -> ResolveError {
    ResolveError::NotFound {
        kind,
        name: name.to_string(),
        candidates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::PbxprojFixture;

    fn id(s: &str) -> ObjectId {
        ObjectId::parse(s).unwrap()
    }

    fn resolve(
        fixture: &PbxprojFixture,
        file: &str,
        target: &str,
    ) -> Result<Resolution, ResolveError> {
        let doc = ProjectDocument::parse(&fixture.render());
        Resolver::new(&doc).resolve(&SourceQuery::new(file, target))
    }

    #[test]
    fn test_resolves_every_step() {
        let resolution =
            resolve(&PbxprojFixture::watch_app(), "WatchApp.swift", "WatchApp").unwrap();

        assert_eq!(
            resolution,
            Resolution {
                file_ref: id(PbxprojFixture::WATCH_APP_FILE_REF),
                build_file: id(PbxprojFixture::WATCH_APP_BUILD_FILE),
                target: id(PbxprojFixture::WATCH_TARGET),
                sources_phase: id(PbxprojFixture::WATCH_SOURCES_PHASE),
            }
        );
    }

    #[test]
    fn test_missing_file_reference() {
        let err = resolve(&PbxprojFixture::watch_app(), "watchapp.swift", "WatchApp").unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotFound {
                kind: RecordKind::FileReference,
                name: "watchapp.swift".to_string(),
                candidates: vec!["WatchApp.swift".to_string()],
            }
        );
    }

    #[test]
    fn test_removed_build_file_is_never_a_success() {
        let fixture =
            PbxprojFixture::watch_app().without_build_file(PbxprojFixture::WATCH_APP_BUILD_FILE);
        let err = resolve(&fixture, "WatchApp.swift", "WatchApp").unwrap_err();
        assert!(matches!(
            err,
            ResolveError::NotFound {
                kind: RecordKind::BuildFile,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_target() {
        let err = resolve(&PbxprojFixture::watch_app(), "WatchApp.swift", "Widget").unwrap_err();
        match err {
            ResolveError::NotFound {
                kind: RecordKind::NativeTarget,
                candidates,
                ..
            } => assert_eq!(candidates, vec!["Vecord".to_string(), "WatchApp".to_string()]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_target_without_sources_phase() {
        let fixture = PbxprojFixture::watch_app().without_sources_phase();
        let err = resolve(&fixture, "WatchApp.swift", "WatchApp").unwrap_err();
        match err {
            ResolveError::MissingSourcesPhase {
                target_id,
                build_phases,
                ..
            } => {
                assert_eq!(target_id, id(PbxprojFixture::WATCH_TARGET));
                assert_eq!(build_phases.len(), 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_build_file_not_in_phase() {
        let fixture =
            PbxprojFixture::watch_app().without_phase_entry(PbxprojFixture::WATCH_APP_BUILD_FILE);
        let err = resolve(&fixture, "WatchApp.swift", "WatchApp").unwrap_err();
        assert_eq!(
            err,
            ResolveError::NotMember {
                file: "WatchApp.swift".to_string(),
                target: "WatchApp".to_string(),
                phase_id: id(PbxprojFixture::WATCH_SOURCES_PHASE),
                build_files: vec![id(PbxprojFixture::WATCH_APP_BUILD_FILE)],
            }
        );
    }

    #[test]
    fn test_file_compiled_by_other_target_only() {
        // AppDelegate.swift is only in the iOS app's sources phase
        let err =
            resolve(&PbxprojFixture::watch_app(), "AppDelegate.swift", "WatchApp").unwrap_err();
        assert!(matches!(err, ResolveError::NotMember { .. }));

        assert!(resolve(&PbxprojFixture::watch_app(), "AppDelegate.swift", "Vecord").is_ok());
    }

    #[test]
    fn test_file_looked_up_by_path() {
        let resolution = resolve(
            &PbxprojFixture::watch_app(),
            "WatchApp/WatchApp.swift",
            "WatchApp",
        )
        .unwrap();
        assert_eq!(resolution.build_file, id(PbxprojFixture::WATCH_APP_BUILD_FILE));
    }

    #[test]
    fn test_build_file_labelled_for_another_file_is_rejected() {
        // Points at WatchApp.swift but is labelled as ContentView.swift
        let fixture = PbxprojFixture::new()
            .file(PbxprojFixture::WATCH_APP_FILE_REF, "WatchApp.swift", "WatchApp.swift")
            .build_file(
                PbxprojFixture::WATCH_APP_BUILD_FILE,
                PbxprojFixture::WATCH_APP_FILE_REF,
                "ContentView.swift",
            );
        let doc = ProjectDocument::parse(&fixture.render());
        let resolver = Resolver::new(&doc);
        let refs = resolver.file_references("WatchApp.swift").unwrap();

        assert!(resolver.build_files("WatchApp.swift", &refs).is_err());
    }

    #[test]
    fn test_membership_follows_phase_order() {
        const SECOND_BUILD_FILE: &str = "9C1D2E3F4A5B6C7D8E9F0A1D";

        // Two build files for one reference, listed in the phase in reverse
        // document order
        let fixture = PbxprojFixture::new()
            .file(PbxprojFixture::WATCH_APP_FILE_REF, "WatchApp.swift", "WatchApp.swift")
            .build_file(
                PbxprojFixture::WATCH_APP_BUILD_FILE,
                PbxprojFixture::WATCH_APP_FILE_REF,
                "WatchApp.swift",
            )
            .build_file(SECOND_BUILD_FILE, PbxprojFixture::WATCH_APP_FILE_REF, "WatchApp.swift")
            .target(
                PbxprojFixture::WATCH_TARGET,
                "WatchApp",
                "VecordWatch",
                &[PbxprojFixture::WATCH_SOURCES_PHASE],
            )
            .phase(
                PbxprojFixture::WATCH_SOURCES_PHASE,
                "PBXSourcesBuildPhase",
                "Sources",
                &[SECOND_BUILD_FILE, PbxprojFixture::WATCH_APP_BUILD_FILE],
            );

        let resolution = resolve(&fixture, "WatchApp.swift", "WatchApp").unwrap();
        assert_eq!(resolution.build_file, id(SECOND_BUILD_FILE));
    }

    #[test]
    fn test_target_matched_by_product_name() {
        let fixture = PbxprojFixture::watch_app();
        let doc = ProjectDocument::parse(&fixture.render());
        let target = Resolver::new(&doc).native_target("VecordWatch").unwrap();
        assert_eq!(target.id, id(PbxprojFixture::WATCH_TARGET));
    }
}

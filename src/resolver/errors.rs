//! Resolution error types and diagnostics.

use serde::Serialize;
use thiserror::Error;

use crate::core::{ObjectId, RecordKind};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// A step of the source-membership chain that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ResolveError {
    #[error("no {kind} named `{name}`")]
    NotFound {
        kind: RecordKind,
        name: String,
        /// Near misses worth showing to the user
        candidates: Vec<String>,
    },

    #[error("target `{target}` has no PBXSourcesBuildPhase")]
    MissingSourcesPhase {
        target: String,
        target_id: ObjectId,
        build_phases: Vec<ObjectId>,
    },

    #[error("`{file}` is not in the sources phase of target `{target}`")]
    NotMember {
        file: String,
        target: String,
        phase_id: ObjectId,
        build_files: Vec<ObjectId>,
    },
}

impl ResolveError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::NotFound {
                kind,
                name,
                candidates,
            } => {
                let mut diag = Diagnostic::error(self.to_string());

                if !candidates.is_empty() {
                    let label = match kind {
                        RecordKind::NativeTarget => "available targets",
                        _ => "did you mean",
                    };
                    diag = diag.with_context(format!("{}: {}", label, candidates.join(", ")));
                }

                match kind {
                    RecordKind::FileReference => diag
                        .with_context(format!("`{}` is not known to the project at all", name))
                        .with_suggestion(format!(
                            "Add `{}` to the project (File > Add Files...) with the target checked",
                            name
                        )),
                    RecordKind::BuildFile => diag
                        .with_context(format!(
                            "`{}` is in the project but was never added to a build phase",
                            name
                        ))
                        .with_suggestion(format!(
                            "Tick the target under Target Membership for `{}` in the File inspector",
                            name
                        )),
                    RecordKind::NativeTarget => {
                        diag.with_suggestion(suggestions::LIST_TARGETS)
                    }
                    RecordKind::SourcesBuildPhase => diag,
                }
            }

            ResolveError::MissingSourcesPhase {
                target_id,
                build_phases,
                ..
            } => {
                let mut diag = Diagnostic::error(self.to_string())
                    .with_context(format!("target id: {}", target_id));

                if build_phases.is_empty() {
                    diag = diag.with_context("the target lists no build phases");
                } else {
                    let ids: Vec<_> = build_phases.iter().map(ObjectId::as_str).collect();
                    diag = diag.with_context(format!("build phases: {}", ids.join(", ")));
                }

                diag.with_suggestion("Add a Compile Sources phase under Build Phases")
                    .with_suggestion(suggestions::LIST_TARGETS)
            }

            ResolveError::NotMember {
                file,
                target,
                phase_id,
                build_files,
            } => {
                let ids: Vec<_> = build_files.iter().map(ObjectId::as_str).collect();

                Diagnostic::error(self.to_string())
                    .with_context(format!("sources phase: {}", phase_id))
                    .with_context(format!(
                        "build file(s) for `{}` that are not listed: {}",
                        file,
                        ids.join(", ")
                    ))
                    .with_suggestion(format!(
                        "Add `{}` to Compile Sources of `{}`; it is probably compiled by another target",
                        file, target
                    ))
            }
        }
    }
}

//! Target listing.
//!
//! Prints every native target with its build phases and the files its
//! sources phase compiles. Useful when a `check` names the wrong target.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::core::{ObjectId, ProjectDocument, Record, RecordKind};

/// A build phase as listed by a target.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseSummary {
    pub id: ObjectId,

    /// `None` for phases that are not sources phases, or dangling ids
    pub kind: Option<RecordKind>,
}

/// One native target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetSummary {
    pub id: ObjectId,
    pub name: String,
    pub product_name: Option<String>,
    pub phases: Vec<PhaseSummary>,

    /// Names of the files compiled by the first sources phase
    pub sources: Vec<String>,
}

/// All targets of a document.
#[derive(Debug, Clone, Serialize)]
pub struct TargetList {
    pub project: Option<PathBuf>,
    pub targets: Vec<TargetSummary>,
}

/// List the targets of a document on disk.
pub fn list_targets(project: &Path) -> Result<TargetList> {
    let doc = ProjectDocument::load(project)?;
    Ok(summarize(&doc))
}

/// List the targets of a parsed document, in document order.
pub fn summarize(doc: &ProjectDocument) -> TargetList {
    let targets = doc
        .of_kind(RecordKind::NativeTarget)
        .filter_map(|record| record.as_native_target().map(|t| (record, t)))
        .map(|(record, target)| {
            let phases: Vec<_> = target
                .build_phases
                .iter()
                .map(|id| PhaseSummary {
                    id: id.clone(),
                    kind: doc.get(id).map(Record::kind),
                })
                .collect();

            let sources = target
                .build_phases
                .iter()
                .filter_map(|id| doc.get(id))
                .find_map(Record::as_sources_phase)
                .map(|phase| {
                    phase
                        .files
                        .iter()
                        .map(|id| {
                            doc.build_file_name(id)
                                .map(str::to_string)
                                .unwrap_or_else(|| format!("{} (unresolved)", id))
                        })
                        .collect()
                })
                .unwrap_or_default();

            TargetSummary {
                id: record.id.clone(),
                name: target
                    .name
                    .clone()
                    .unwrap_or_else(|| record.display_name().to_string()),
                product_name: target.product_name.clone(),
                phases,
                sources,
            }
        })
        .collect();

    TargetList {
        project: doc.path().map(Path::to_path_buf),
        targets,
    }
}

/// Format the target list for display.
pub fn format_targets(list: &TargetList) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    if list.targets.is_empty() {
        writeln!(output, "No native targets found").unwrap();
        return output;
    }

    for (i, target) in list.targets.iter().enumerate() {
        if i > 0 {
            writeln!(output).unwrap();
        }

        write!(output, "{} {}", target.id, target.name).unwrap();
        match &target.product_name {
            Some(product) if product != &target.name => {
                writeln!(output, " (product: {})", product).unwrap()
            }
            _ => writeln!(output).unwrap(),
        }

        writeln!(output, "  Build phases:").unwrap();
        for phase in &target.phases {
            let kind = phase.kind.map(|k| k.isa()).unwrap_or("other");
            writeln!(output, "    - {} {}", phase.id, kind).unwrap();
        }

        if target.sources.is_empty() {
            writeln!(output, "  Sources: (none)").unwrap();
        } else {
            writeln!(output, "  Sources ({}):", target.sources.len()).unwrap();
            for source in &target.sources {
                writeln!(output, "    - {}", source).unwrap();
            }
        }
    }

    output
}

//! Source membership check.
//!
//! The `check` command answers whether a source file is compiled into a
//! target, and if not, which link of the chain is missing.
//!
//! ## Usage
//!
//! ```bash
//! xcprobe check --file WatchApp.swift --target WatchApp
//! xcprobe check --project ios/Vecord.xcodeproj/project.pbxproj \
//!     --file WatchApp.swift --target WatchApp
//! ```
//!
//! ## Steps Performed
//!
//! - File reference lookup (is the file in the project at all?)
//! - Build file lookup (was it ever added to a build phase?)
//! - Target lookup
//! - Sources phase lookup and membership
//!
//! The file steps and the target steps are evaluated independently, so a
//! missing build file still shows what the target compiles.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::core::{ObjectId, ProjectDocument, Record, RecordKind};
use crate::resolver::{LinkedBuildFile, Resolution, ResolveError, Resolver, SourceQuery};
use crate::util::Diagnostic;

/// One step of the lookup chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    FileReference,
    BuildFile,
    NativeTarget,
    SourcesPhase,
    Membership,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::FileReference => "file reference",
            Step::BuildFile => "build file",
            Step::NativeTarget => "target",
            Step::SourcesPhase => "sources phase",
            Step::Membership => "membership",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Passed,
    Failed,
    /// Not attempted because an earlier step failed
    Skipped,
}

/// Result of a single step.
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub step: Step,
    pub status: StepStatus,

    /// Human-readable status message
    pub message: String,

    /// Ids the step resolved to
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<ObjectId>,
}

impl StepResult {
    fn passed(step: Step, message: impl Into<String>, ids: Vec<ObjectId>) -> Self {
        StepResult {
            step,
            status: StepStatus::Passed,
            message: message.into(),
            ids,
        }
    }

    fn failed(step: Step, error: &ResolveError) -> Self {
        StepResult {
            step,
            status: StepStatus::Failed,
            message: error.to_string(),
            ids: Vec::new(),
        }
    }

    fn skipped(step: Step, reason: impl Into<String>) -> Self {
        StepResult {
            step,
            status: StepStatus::Skipped,
            message: reason.into(),
            ids: Vec::new(),
        }
    }
}

/// A build phase listed by the target.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseEntry {
    pub id: ObjectId,
    pub label: Option<String>,

    /// `None` for phases that are not materialized (frameworks, resources...)
    pub kind: Option<RecordKind>,
}

/// A file compiled by the target's sources phase.
#[derive(Debug, Clone, Serialize)]
pub struct SourceEntry {
    pub build_file: ObjectId,
    pub file: Option<String>,

    /// Whether this is a build file of the queried file
    pub queried: bool,
}

/// Summary of a source membership check.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub project: Option<PathBuf>,
    pub file: String,
    pub target: String,
    pub steps: Vec<StepResult>,

    /// Build phases of the target, when the target was found
    pub phases: Vec<PhaseEntry>,

    /// Files of the target's sources phase, when it was found
    pub sources: Vec<SourceEntry>,

    pub resolution: Option<Resolution>,
    pub error: Option<ResolveError>,

    /// Document integrity problems
    pub warnings: Vec<String>,
}

impl CheckReport {
    fn new(project: Option<&Path>, query: &SourceQuery) -> Self {
        CheckReport {
            project: project.map(Path::to_path_buf),
            file: query.file.clone(),
            target: query.target.clone(),
            steps: Vec::new(),
            phases: Vec::new(),
            sources: Vec::new(),
            resolution: None,
            error: None,
            warnings: Vec::new(),
        }
    }

    /// Whether the file is compiled into the target.
    pub fn is_compiled(&self) -> bool {
        self.resolution.is_some()
    }

    /// Result of one step, if it was recorded.
    pub fn step(&self, step: Step) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.step == step)
    }

    fn fail(&mut self, step: Step, error: ResolveError) {
        self.steps.push(StepResult::failed(step, &error));
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

/// Options for the check command.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Path to `project.pbxproj`
    pub project: PathBuf,

    /// File and target to look up
    pub query: SourceQuery,
}

/// Run the check against a document on disk.
///
/// An unreadable document is an error; every lookup failure is part of the
/// report instead.
pub fn check(options: &CheckOptions) -> Result<CheckReport> {
    let doc = ProjectDocument::load(&options.project)?;
    Ok(check_document(&doc, &options.query))
}

/// Run the check against a parsed document.
pub fn check_document(doc: &ProjectDocument, query: &SourceQuery) -> CheckReport {
    let resolver = Resolver::new(doc);
    let mut report = CheckReport::new(doc.path(), query);
    report.warnings = doc.integrity_warnings();

    let linked = resolve_file_chain(&resolver, query, &mut report);
    let phase = resolve_target_chain(doc, &resolver, query, &mut report, linked.as_deref());

    match (linked, phase) {
        (Some(linked), Some((target, phase))) => {
            match resolver.membership(query, phase, &linked) {
                Ok(member) => {
                    report.steps.push(StepResult::passed(
                        Step::Membership,
                        format!(
                            "{} is compiled into {} (build file {})",
                            query.file, query.target, member.build_file.id
                        ),
                        vec![member.build_file.id.clone()],
                    ));
                    report.resolution = Some(Resolution {
                        file_ref: member.file_ref.id.clone(),
                        build_file: member.build_file.id.clone(),
                        target: target.id.clone(),
                        sources_phase: phase.id.clone(),
                    });
                }
                Err(e) => report.fail(Step::Membership, e),
            }
        }
        _ => report.steps.push(StepResult::skipped(
            Step::Membership,
            "not checked because an earlier step failed",
        )),
    }

    report
}

/// Steps 1 and 2.
fn resolve_file_chain<'a>(
    resolver: &Resolver<'a>,
    query: &SourceQuery,
    report: &mut CheckReport,
) -> Option<Vec<LinkedBuildFile<'a>>> {
    let file_refs = match resolver.file_references(&query.file) {
        Ok(refs) => refs,
        Err(e) => {
            report.fail(Step::FileReference, e);
            report.steps.push(StepResult::skipped(
                Step::BuildFile,
                "no file reference to look for",
            ));
            return None;
        }
    };

    let ids = ids_of(&file_refs);
    report.steps.push(StepResult::passed(
        Step::FileReference,
        format!("{} file reference: {}", query.file, join_ids(&ids)),
        ids,
    ));

    match resolver.build_files(&query.file, &file_refs) {
        Ok(linked) => {
            let ids: Vec<_> = linked.iter().map(|l| l.build_file.id.clone()).collect();
            report.steps.push(StepResult::passed(
                Step::BuildFile,
                format!("{} build file: {}", query.file, join_ids(&ids)),
                ids,
            ));
            Some(linked)
        }
        Err(e) => {
            report.fail(Step::BuildFile, e);
            None
        }
    }
}

/// Steps 3 and 4a, recording the phase listing along the way.
fn resolve_target_chain<'a>(
    doc: &'a ProjectDocument,
    resolver: &Resolver<'a>,
    query: &SourceQuery,
    report: &mut CheckReport,
    linked: Option<&[LinkedBuildFile<'a>]>,
) -> Option<(&'a Record, &'a Record)> {
    let target = match resolver.native_target(&query.target) {
        Ok(target) => target,
        Err(e) => {
            report.fail(Step::NativeTarget, e);
            report.steps.push(StepResult::skipped(
                Step::SourcesPhase,
                "no target to look in",
            ));
            return None;
        }
    };

    report.steps.push(StepResult::passed(
        Step::NativeTarget,
        format!("{} target: {}", query.target, target.id),
        vec![target.id.clone()],
    ));

    if let Some(native) = target.as_native_target() {
        report.phases = native
            .build_phases
            .iter()
            .map(|id| {
                let record = doc.get(id);
                PhaseEntry {
                    id: id.clone(),
                    label: record.and_then(|r| r.label.clone()),
                    kind: record.map(Record::kind),
                }
            })
            .collect();
    }

    let phase = match resolver.sources_phase(target) {
        Ok(phase) => phase,
        Err(e) => {
            report.fail(Step::SourcesPhase, e);
            return None;
        }
    };

    let files = phase
        .as_sources_phase()
        .map(|p| p.files.as_slice())
        .unwrap_or_default();

    report.steps.push(StepResult::passed(
        Step::SourcesPhase,
        format!("{} sources phase: {} ({} files)", query.target, phase.id, files.len()),
        vec![phase.id.clone()],
    ));

    report.sources = files
        .iter()
        .map(|id| SourceEntry {
            build_file: id.clone(),
            file: doc.build_file_name(id).map(str::to_string),
            queried: linked
                .map(|l| l.iter().any(|l| &l.build_file.id == id))
                .unwrap_or(false),
        })
        .collect();

    Some((target, phase))
}

fn ids_of(records: &[&Record]) -> Vec<ObjectId> {
    records.iter().map(|r| r.id.clone()).collect()
}

fn join_ids(ids: &[ObjectId]) -> String {
    ids.iter().map(ObjectId::as_str).collect::<Vec<_>>().join(", ")
}

/// Format the check report for display.
///
/// Build phases and the sources listing are shown when verbose or when the
/// check failed.
pub fn format_report(report: &CheckReport, verbose: bool, color: bool) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    writeln!(output, "Source check: {} in target {}", report.file, report.target).unwrap();
    writeln!(output, "{}", "=".repeat(50)).unwrap();
    if let Some(project) = &report.project {
        writeln!(output, "Project: {}", project.display()).unwrap();
    }
    writeln!(output).unwrap();

    writeln!(output, "Steps:").unwrap();
    for step in &report.steps {
        let status = match step.status {
            StepStatus::Passed => "[OK]  ",
            StepStatus::Failed => "[FAIL]",
            StepStatus::Skipped => "[SKIP]",
        };
        writeln!(output, "  {} {:<15} {}", status, step.step.as_str(), step.message).unwrap();
    }

    let show_details = verbose || !report.is_compiled();

    if show_details && !report.phases.is_empty() {
        writeln!(output, "\nBuild phases of {}:", report.target).unwrap();
        for phase in &report.phases {
            match phase.kind {
                Some(kind) => writeln!(
                    output,
                    "  - {} {} ({})",
                    phase.id,
                    phase.label.as_deref().unwrap_or("-"),
                    kind
                )
                .unwrap(),
                None => writeln!(output, "  - {} (not a sources phase)", phase.id).unwrap(),
            }
        }
    }

    let phase_passed =
        report.step(Step::SourcesPhase).map(|s| s.status) == Some(StepStatus::Passed);
    if show_details && phase_passed {
        writeln!(output, "\nFiles in sources phase ({}):", report.sources.len()).unwrap();
        for source in &report.sources {
            let marker = if source.queried { "*" } else { "-" };
            writeln!(
                output,
                "  {} {} {}",
                marker,
                source.build_file,
                source.file.as_deref().unwrap_or("(unresolved)")
            )
            .unwrap();
        }
    }

    if !report.warnings.is_empty() {
        writeln!(output).unwrap();
        for warning in &report.warnings {
            output.push_str(&Diagnostic::warning(warning).format(color));
        }
    }

    writeln!(output).unwrap();
    match (&report.resolution, &report.error) {
        (Some(_), _) => {
            writeln!(
                output,
                "Result: COMPILED ({} is compiled into {})",
                report.file, report.target
            )
            .unwrap();
        }
        (None, Some(error)) => {
            let mut diag = error.to_diagnostic();
            if let Some(project) = &report.project {
                diag = diag.with_location(project);
            }
            output.push_str(&diag.format(color));
            writeln!(output, "\nResult: NOT COMPILED").unwrap();
        }
        (None, None) => {
            writeln!(output, "Result: NOT COMPILED").unwrap();
        }
    }

    output
}

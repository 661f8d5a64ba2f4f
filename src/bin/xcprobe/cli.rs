//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use xcprobe::util::shell::ColorChoice;

/// xcprobe - Find out why a watchOS/iOS build ships the wrong thing
#[derive(Parser)]
#[command(name = "xcprobe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (full reports, debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors and the report itself
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_name = "WHEN")]
    pub color: ColorChoice,

    /// Output format for reports
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether a source file is compiled into a target
    Check(CheckArgs),

    /// List native targets with their build phases and sources
    Targets(TargetsArgs),

    /// Scan a directory for files with a given binary header
    Scan(ScanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct CheckArgs {
    /// Path to project.pbxproj (discovered in . or ios/ when omitted)
    #[arg(long, env = "XCPROBE_PROJECT")]
    pub project: Option<PathBuf>,

    /// Source file to look up (e.g., WatchApp.swift)
    #[arg(long)]
    pub file: Option<String>,

    /// Target expected to compile the file (name or product name)
    #[arg(long)]
    pub target: Option<String>,
}

#[derive(Args)]
pub struct TargetsArgs {
    /// Path to project.pbxproj (discovered in . or ios/ when omitted)
    #[arg(long, env = "XCPROBE_PROJECT")]
    pub project: Option<PathBuf>,
}

#[derive(Args)]
pub struct ScanArgs {
    /// Directory to scan (e.g., DerivedData/.../Build/Products/Debug-watchsimulator)
    pub root: Option<PathBuf>,

    /// Byte pattern as hex (repeatable; replaces the default patterns)
    #[arg(long = "pattern", value_name = "HEX")]
    pub patterns: Vec<String>,

    /// Also scan files whose name starts with `.`
    #[arg(long)]
    pub include_hidden: bool,

    /// Follow symbolic links
    #[arg(long)]
    pub follow_links: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

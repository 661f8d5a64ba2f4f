//! `xcprobe targets` command

use anyhow::{Context, Result};

use crate::cli::TargetsArgs;
use crate::GlobalOptions;
use xcprobe::ops::targets::{format_targets, list_targets};
use xcprobe::util::config::load_config_for;
use xcprobe::util::shell::Status;

pub fn execute(args: TargetsArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;

    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let config = load_config_for(&cwd);
    let project = super::resolve_project(args.project, config.check.project)?;

    shell.status(Status::Parsing, project.display());
    let list = list_targets(&project)?;

    if shell.is_json() {
        shell.print_json(&list)
    } else {
        shell.print_report(&format_targets(&list))
    }
}

//! `xcprobe check` command

use anyhow::{bail, Context, Result};

use crate::cli::CheckArgs;
use crate::GlobalOptions;
use xcprobe::ops::check::{check, format_report, CheckOptions};
use xcprobe::resolver::SourceQuery;
use xcprobe::util::config::load_config_for;
use xcprobe::util::diagnostic::suggestions;
use xcprobe::util::shell::Status;

pub fn execute(args: CheckArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;

    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let config = load_config_for(&cwd);

    // CLI overrides config
    let (file, target) = match (
        args.file.or(config.check.file),
        args.target.or(config.check.target),
    ) {
        (Some(file), Some(target)) => (file, target),
        _ => bail!("both a file and a target are required\n\n{}", suggestions::MISSING_QUERY),
    };

    let project = super::resolve_project(args.project, config.check.project)?;

    shell.status(
        Status::Checking,
        format!("{} in target {} ({})", file, target, project.display()),
    );

    let options = CheckOptions {
        project,
        query: SourceQuery::new(file, target),
    };
    let report = check(&options)?;

    if shell.is_json() {
        shell.print_json(&report)?;
    } else {
        shell.print_report(&format_report(&report, shell.is_verbose(), shell.use_color()))?;
    }

    // Exit with error code if the file is not compiled into the target
    if !report.is_compiled() {
        std::process::exit(1);
    }

    Ok(())
}

//! `xcprobe scan` command

use anyhow::{bail, Context, Result};

use crate::cli::ScanArgs;
use crate::GlobalOptions;
use xcprobe::ops::scan::{format_report, scan, MagicPattern, ScanOptions};
use xcprobe::util::config::load_config_for;
use xcprobe::util::shell::{format_duration, Status};

pub fn execute(args: ScanArgs, global_opts: &GlobalOptions) -> Result<()> {
    let shell = &global_opts.shell;

    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let config = load_config_for(&cwd);

    // Root: CLI > config
    let Some(root) = args.root.or(config.scan.root) else {
        bail!("no directory to scan; pass ROOT or set `scan.root` in .xcprobe/config.toml");
    };

    // Patterns: CLI > config > built-in
    let raw = if args.patterns.is_empty() {
        config.scan.patterns
    } else {
        args.patterns
    };
    let patterns = if raw.is_empty() {
        MagicPattern::defaults()
    } else {
        raw.iter()
            .map(|p| p.parse::<MagicPattern>())
            .collect::<Result<Vec<_>, _>>()
            .context("invalid byte pattern")?
    };

    let options = ScanOptions {
        root,
        patterns,
        include_hidden: args.include_hidden || config.scan.include_hidden,
        follow_links: args.follow_links || config.scan.follow_links,
    };

    shell.status(Status::Scanning, options.root.display());

    let progress = shell.spinner(format!("Scanning {}", options.root.display()));
    let result = scan(&options, |_| progress.inc(1));
    progress.finish();
    let report = result?;

    if shell.is_json() {
        return shell.print_json(&report);
    }

    shell.print_report(&format_report(&report, shell.is_verbose()))?;
    if !report.skipped.is_empty() && !shell.is_verbose() {
        shell.warn(format!(
            "{} entries could not be read; rerun with --verbose to list them",
            report.skipped.len()
        ));
    }
    shell.status(
        Status::Finished,
        format!(
            "{} matching file(s) in {}",
            report.matches.len(),
            format_duration(report.duration)
        ),
    );

    Ok(())
}

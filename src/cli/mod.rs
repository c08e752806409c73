//! Command line interface.
//!
//! Loads the release configuration, builds a
//! [`ReleaseContext`](crate::release::ReleaseContext) from the arguments and
//! runs the workflow steps of the requested command.

mod args;

pub use args::{Args, Command};

use crate::error::{CliError, Result};
use crate::metadata;
use crate::release::{
    ContextBuilder, ReleaseContext, ReleaseSummary, builder::selection::select, run_workflow,
};
use std::io::Write;

/// Main CLI entry point
pub fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(&args)
}

/// Runs `args`, returning the process exit code.
pub fn execute(args: &Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let basedir = match &args.basedir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let config = metadata::discover(&basedir, args.config_file.as_deref())?;
    log::info!("Loading {}", config.display());
    let model = metadata::load_model(&config)?;

    let ctx = ContextBuilder::new()
        .model(model)
        .basedir(&basedir)
        .output_directory(&args.output_directory)
        .dry_run(args.dry_run)
        .filters(args.filters())
        .build()?;
    if ctx.is_dry_run() {
        log::info!("Dry run: nothing will be published");
    }

    if args.command == Command::Config {
        print_config(&ctx)?;
        return Ok(0);
    }

    let summary = run_workflow(&ctx, &args.command.steps())?;
    report(&summary);
    Ok(if summary.is_success() { 0 } else { 1 })
}

/// Prints the resolved project, distributions and enabled packagers.
fn print_config(ctx: &ReleaseContext) -> Result<()> {
    let model = ctx.model();
    let project = &model.project;
    let mut out = std::io::stdout().lock();

    writeln!(out, "project: {} {}", project.name(), project.version())?;
    if project.is_snapshot() {
        writeln!(out, "  snapshot: {}", project.snapshot_label())?;
    }
    writeln!(
        out,
        "release: {} {}/{}",
        model.release.service,
        model.release.owner(),
        model.release.name(project)
    )?;
    let algorithms: Vec<String> = model
        .checksum
        .algorithms()
        .iter()
        .map(ToString::to_string)
        .collect();
    writeln!(out, "checksums: {}", algorithms.join(", "))?;
    writeln!(out, "signing: {}", if model.signing.is_enabled() { "enabled" } else { "disabled" })?;

    writeln!(out, "distributions:")?;
    for selection in select(model, ctx.filters())? {
        let distribution = selection.distribution;
        writeln!(
            out,
            "  {} ({})",
            distribution.name,
            distribution.distribution_type.as_str()
        )?;
        for artifact in distribution.artifacts.iter().filter(|a| a.active) {
            match artifact.platform.as_deref() {
                Some(platform) => writeln!(out, "    artifact: {} [{}]", artifact.path, platform)?,
                None => writeln!(out, "    artifact: {}", artifact.path)?,
            }
        }
        let packagers: Vec<&str> = selection.packagers.iter().map(|p| p.name()).collect();
        if packagers.is_empty() {
            writeln!(out, "    packagers: none")?;
        } else {
            writeln!(out, "    packagers: {}", packagers.join(", "))?;
        }
    }
    Ok(())
}

fn report(summary: &ReleaseSummary) {
    if !summary.skipped.is_empty() {
        let skipped: Vec<String> = summary
            .skipped
            .iter()
            .map(|(distribution, packager)| format!("{}/{}", distribution, packager))
            .collect();
        log::info!("Skipped without artifacts: {}", skipped.join(", "));
    }
    for failure in &summary.failures {
        log::error!(
            "{} {} failed for {}: {}",
            failure.packager,
            failure.step,
            failure.distribution,
            failure.message
        );
    }
    if summary.is_success() {
        log::info!("✓ Done: {} packager run(s)", summary.processed.len());
    } else {
        log::warn!(
            "Finished with {} failure(s), {} packager run(s) succeeded",
            summary.failures.len(),
            summary.processed.len()
        );
    }
}

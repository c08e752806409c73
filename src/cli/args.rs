//! Command line argument parsing and validation.

use crate::release::{Filters, WorkflowStep};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release packager orchestrator
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_publish",
    version,
    about = "Packages and publishes a release to Homebrew, Snapcraft, Scoop and friends",
    long_about = "Reads a declarative release.toml and turns every distribution into package
descriptors for the enabled packagers, then publishes them.

Usage:
  kodegen_bundler_publish config
  kodegen_bundler_publish --dry-run full-release
  kodegen_bundler_publish -d cli -p brew -p scoop prepare

Exit code 0 = every selected packager succeeded, 2 = invalid configuration."
)]
pub struct Args {
    /// Release configuration file, relative to the base directory
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Directory artifact paths and templates are resolved against
    #[arg(long, value_name = "DIR", global = true)]
    pub basedir: Option<PathBuf>,

    /// Directory receiving checksums and packager output
    #[arg(
        short = 'o',
        long,
        value_name = "DIR",
        default_value = "out/release",
        global = true
    )]
    pub output_directory: PathBuf,

    /// Log what would be published without touching remote services
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Only process these distributions
    #[arg(short = 'd', long = "distribution", value_name = "NAME", global = true)]
    pub distributions: Vec<String>,

    /// Skip these distributions
    #[arg(long = "exclude-distribution", value_name = "NAME", global = true)]
    pub exclude_distributions: Vec<String>,

    /// Only run these packagers
    #[arg(short = 'p', long = "packager", value_name = "NAME", global = true)]
    pub packagers: Vec<String>,

    /// Skip these packagers
    #[arg(long = "exclude-packager", value_name = "NAME", global = true)]
    pub exclude_packagers: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Validate the configuration and print the resolved model
    Config,
    /// Compute checksum files for every artifact
    Checksum,
    /// Generate package descriptors from templates
    Prepare,
    /// Prepare, then assemble packages
    Package,
    /// Prepare, package, then publish to every channel
    Publish,
    /// Announce the release
    Announce,
    /// Checksum, sign, upload, release, prepare, package, publish and announce
    FullRelease,
}

impl Command {
    /// Workflow steps the command runs. `config` runs none.
    pub fn steps(self) -> Vec<WorkflowStep> {
        match self {
            Command::Config => Vec::new(),
            Command::Checksum => vec![WorkflowStep::Checksum],
            Command::Prepare => vec![WorkflowStep::Prepare],
            Command::Package => vec![WorkflowStep::Prepare, WorkflowStep::Package],
            Command::Publish => vec![
                WorkflowStep::Prepare,
                WorkflowStep::Package,
                WorkflowStep::Publish,
            ],
            Command::Announce => vec![WorkflowStep::Announce],
            Command::FullRelease => WorkflowStep::FULL_RELEASE.to_vec(),
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if !self.distributions.is_empty() && !self.exclude_distributions.is_empty() {
            return Err("--distribution and --exclude-distribution cannot be combined".to_string());
        }
        if !self.packagers.is_empty() && !self.exclude_packagers.is_empty() {
            return Err("--packager and --exclude-packager cannot be combined".to_string());
        }
        Ok(())
    }

    pub fn filters(&self) -> Filters {
        Filters {
            distributions: self.distributions.clone(),
            exclude_distributions: self.exclude_distributions.clone(),
            packagers: self.packagers.clone(),
            exclude_packagers: self.exclude_packagers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_options_after_the_command() {
        let args = Args::try_parse_from([
            "kodegen_bundler_publish",
            "prepare",
            "-d",
            "cli",
            "-p",
            "brew",
            "-p",
            "scoop",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(args.command, Command::Prepare);
        assert!(args.dry_run);
        assert_eq!(args.output_directory, PathBuf::from("out/release"));
        let filters = args.filters();
        assert_eq!(filters.distributions, vec!["cli"]);
        assert_eq!(filters.packagers, vec!["brew", "scoop"]);
    }

    #[test]
    fn include_and_exclude_conflict() {
        let args = Args::try_parse_from([
            "kodegen_bundler_publish",
            "-p",
            "brew",
            "--exclude-packager",
            "snap",
            "publish",
        ])
        .unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn full_release_runs_every_step() {
        assert_eq!(Command::FullRelease.steps().len(), 8);
        assert!(Command::Config.steps().is_empty());
        assert_eq!(
            Command::Publish.steps().last(),
            Some(&WorkflowStep::Publish)
        );
    }
}

//! Release workflow.
//!
//! Runs the requested [`WorkflowStep`]s over a [`ReleaseContext`] in their
//! canonical order. Release-wide steps work on the artifacts of every selected
//! distribution; packager steps visit each selected (distribution, packager)
//! pair in turn, distribution by distribution.

use super::{
    checksum::write_checksum_files,
    context::ReleaseContext,
    fill::fill_props,
    remote,
    selection::{select, select_distributions},
    signing::sign_files,
};
use crate::release::{
    error::{Error, ErrorKind, Result},
    platform::{ToolProcessor, processor_for},
    props::PropertyContext,
    settings::{Distribution, Packager, PackagerType},
};
use std::{fmt, path::PathBuf};

/// One stage of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WorkflowStep {
    Checksum,
    Sign,
    Upload,
    Release,
    Prepare,
    Package,
    Publish,
    Announce,
}

impl WorkflowStep {
    /// Every step, in the order a full release runs them.
    pub const FULL_RELEASE: [WorkflowStep; 8] = [
        WorkflowStep::Checksum,
        WorkflowStep::Sign,
        WorkflowStep::Upload,
        WorkflowStep::Release,
        WorkflowStep::Prepare,
        WorkflowStep::Package,
        WorkflowStep::Publish,
        WorkflowStep::Announce,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStep::Checksum => "checksum",
            WorkflowStep::Sign => "sign",
            WorkflowStep::Upload => "upload",
            WorkflowStep::Release => "release",
            WorkflowStep::Prepare => "prepare",
            WorkflowStep::Package => "package",
            WorkflowStep::Publish => "publish",
            WorkflowStep::Announce => "announce",
        }
    }

    /// Whether the step runs once per (distribution, packager) pair.
    pub fn is_packager_step(self) -> bool {
        matches!(
            self,
            WorkflowStep::Prepare | WorkflowStep::Package | WorkflowStep::Publish
        )
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved artifact file of a selected distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseArtifact {
    pub path: PathBuf,
    /// Platform tag, empty when unset.
    pub platform: String,
}

impl ReleaseArtifact {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// A packager failure that was logged and skipped because the packager
/// continues on error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerFailure {
    pub distribution: String,
    pub packager: PackagerType,
    pub step: WorkflowStep,
    pub message: String,
}

/// What a workflow run did.
#[derive(Debug, Default)]
pub struct ReleaseSummary {
    pub checksum_files: Vec<PathBuf>,
    pub signatures: Vec<PathBuf>,
    /// `<uploader>:<file>` for every upload.
    pub uploads: Vec<String>,
    /// Whether a release was created on the hosting service.
    pub released: bool,
    /// Pairs that went through every requested packager step.
    pub processed: Vec<(String, PackagerType)>,
    /// Pairs without candidate artifacts.
    pub skipped: Vec<(String, PackagerType)>,
    pub failures: Vec<PackagerFailure>,
    /// Files written by the prepare and package steps.
    pub files: Vec<PathBuf>,
    /// Announcers that sent the release message.
    pub announced: Vec<String>,
}

impl ReleaseSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Active artifacts of every selected distribution, paths resolved and
/// duplicates dropped.
pub fn release_artifacts(ctx: &ReleaseContext) -> Result<Vec<ReleaseArtifact>> {
    let release_props = ctx.props()?;
    let mut artifacts: Vec<ReleaseArtifact> = Vec::new();
    for distribution in select_distributions(ctx.model(), ctx.filters())? {
        let mut props = distribution.props();
        props.put_all(&release_props);
        for artifact in distribution.artifacts.iter().filter(|a| a.active) {
            let path = artifact.effective_path(ctx.basedir(), &props)?;
            if artifacts.iter().any(|known| known.path == path) {
                continue;
            }
            artifacts.push(ReleaseArtifact {
                path,
                platform: artifact.platform().to_string(),
            });
        }
    }
    Ok(artifacts)
}

/// Runs `steps` over `ctx`.
///
/// Steps run in canonical order whatever order they are given in; duplicates
/// run once.
///
/// # Errors
///
/// Release-wide steps fail the run on the first error. A packager step error
/// fails the run unless the packager continues on error, in which case it is
/// logged and recorded in [`ReleaseSummary::failures`]. Unexpected errors
/// always fail the run.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_publish::release::{ReleaseContext, WorkflowStep, run_workflow};
///
/// # fn example(ctx: ReleaseContext) -> kodegen_bundler_publish::release::Result<()> {
/// let summary = run_workflow(&ctx, &[WorkflowStep::Prepare, WorkflowStep::Package])?;
/// for file in &summary.files {
///     println!("wrote {}", file.display());
/// }
/// # Ok(())
/// # }
/// ```
pub fn run_workflow(ctx: &ReleaseContext, steps: &[WorkflowStep]) -> Result<ReleaseSummary> {
    let mut steps = steps.to_vec();
    steps.sort();
    steps.dedup();

    let mut summary = ReleaseSummary::default();
    let needs_artifacts = steps.iter().any(|s| {
        matches!(
            s,
            WorkflowStep::Checksum | WorkflowStep::Sign | WorkflowStep::Upload | WorkflowStep::Release
        )
    });
    let artifacts = if needs_artifacts {
        release_artifacts(ctx)?
    } else {
        Vec::new()
    };
    let artifact_paths: Vec<PathBuf> = artifacts.iter().map(|a| a.path.clone()).collect();

    let packager_steps: Vec<WorkflowStep> = steps.iter().copied().filter(|s| s.is_packager_step()).collect();

    for step in &steps {
        match step {
            WorkflowStep::Checksum => {
                log::info!("Calculating checksums");
                summary.checksum_files = write_checksum_files(ctx, &artifact_paths)?;
                log::info!("  ✓ {} checksum file(s)", summary.checksum_files.len());
            }
            WorkflowStep::Sign => {
                log::info!("Signing files");
                let mut files = artifact_paths.clone();
                files.extend(summary.checksum_files.iter().cloned());
                summary.signatures = sign_files(ctx, &files)?;
            }
            WorkflowStep::Upload => {
                log::info!("Uploading artifacts");
                summary.uploads = remote::upload(ctx, &artifacts)?;
            }
            WorkflowStep::Release => {
                log::info!("Releasing");
                let mut assets = artifact_paths.clone();
                assets.extend(summary.checksum_files.iter().cloned());
                assets.extend(summary.signatures.iter().cloned());
                summary.released = remote::release(ctx, &assets)?;
            }
            WorkflowStep::Prepare | WorkflowStep::Package | WorkflowStep::Publish => {
                // Packager steps run together, pair by pair, on the first one.
                if packager_steps.first() == Some(step) {
                    process_packagers(ctx, &packager_steps, &mut summary)?;
                }
            }
            WorkflowStep::Announce => {
                log::info!("Announcing");
                summary.announced = remote::announce(ctx)?;
            }
        }
    }
    Ok(summary)
}

fn indent(level: usize) -> String {
    "  ".repeat(level)
}

fn process_packagers(
    ctx: &ReleaseContext,
    steps: &[WorkflowStep],
    summary: &mut ReleaseSummary,
) -> Result<()> {
    let names: Vec<&str> = steps.iter().map(|s| s.as_str()).collect();
    log::info!("Running {} for distributions", names.join(", "));

    for selection in select(ctx.model(), ctx.filters())? {
        let distribution = selection.distribution;
        log::info!("{}- {}", indent(1), distribution.name);
        if selection.packagers.is_empty() {
            log::info!("{}no packagers selected", indent(2));
        }
        for packager in selection.packagers {
            process_pair(ctx, distribution, packager, steps, summary)?;
        }
    }
    Ok(())
}

/// Runs `steps` for one pair, applying the packager's error policy.
fn process_pair(
    ctx: &ReleaseContext,
    distribution: &Distribution,
    packager: &Packager,
    steps: &[WorkflowStep],
    summary: &mut ReleaseSummary,
) -> Result<()> {
    let packager_type = packager.packager_type();
    let processor = processor_for(packager_type);
    let prefix = format!("{}[{}]", indent(2), packager.name());

    let mut current = steps.first().copied().unwrap_or(WorkflowStep::Prepare);
    let result = run_pair_steps(ctx, processor, distribution, packager, steps, &prefix, &mut current);

    match result {
        Ok(Some(files)) => {
            summary.files.extend(files);
            summary.processed.push((distribution.name.clone(), packager_type));
            Ok(())
        }
        Ok(None) => {
            log::info!("{} no matching artifacts, skipping", prefix);
            summary.skipped.push((distribution.name.clone(), packager_type));
            Ok(())
        }
        Err(e) => handle_failure(e, distribution, packager, current, &prefix, summary),
    }
}

/// Fills the pair's properties and runs `steps`, tracking the step in
/// `current`. `None` when the pair has no candidate artifacts.
fn run_pair_steps(
    ctx: &ReleaseContext,
    processor: &dyn ToolProcessor,
    distribution: &Distribution,
    packager: &Packager,
    steps: &[WorkflowStep],
    prefix: &str,
    current: &mut WorkflowStep,
) -> Result<Option<Vec<PathBuf>>> {
    let props = fill_props(ctx, distribution, packager, processor)?;
    if props.is_empty() {
        return Ok(None);
    }
    let mut files = Vec::new();
    for step in steps {
        *current = *step;
        files.extend(run_step(ctx, processor, distribution, packager, &props, *step, prefix)?);
    }
    Ok(Some(files))
}

fn run_step(
    ctx: &ReleaseContext,
    processor: &dyn ToolProcessor,
    distribution: &Distribution,
    packager: &Packager,
    props: &PropertyContext,
    step: WorkflowStep,
    prefix: &str,
) -> Result<Vec<PathBuf>> {
    match step {
        WorkflowStep::Prepare => {
            let files = processor.prepare(ctx, distribution, packager, props)?;
            log::info!("{} ✓ prepared {} file(s)", prefix, files.len());
            Ok(files)
        }
        WorkflowStep::Package => {
            let files = processor.package(ctx, distribution, packager, props)?;
            let directory = ctx.package_directory(&distribution.name, packager.packager_type());
            log::info!("{} ✓ packaged into {}", prefix, ctx.relativize(&directory));
            Ok(files)
        }
        WorkflowStep::Publish => {
            if ctx.model().project.is_snapshot() && !packager.supports_snapshot() {
                log::info!("{} snapshot releases are not published, skipping", prefix);
                return Ok(Vec::new());
            }
            processor.publish(ctx, distribution, packager, props)?;
            log::info!("{} ✓ published", prefix);
            Ok(Vec::new())
        }
        _ => Ok(Vec::new()),
    }
}

fn handle_failure(
    error: Error,
    distribution: &Distribution,
    packager: &Packager,
    step: WorkflowStep,
    prefix: &str,
    summary: &mut ReleaseSummary,
) -> Result<()> {
    let error = error.in_packager(&distribution.name, packager.name());
    if error.kind() != ErrorKind::ToolExecution || !packager.continue_on_error() {
        return Err(error);
    }
    log::error!("{} {} failed: {}", prefix, step, error);
    summary.failures.push(PackagerFailure {
        distribution: distribution.name.clone(),
        packager: packager.packager_type(),
        step,
        message: error.to_string(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::{
        builder::{ContextBuilder, Filters, context::tests::context},
        platform::tests::fixture,
        services::recording::{RecordingRunner, RecordingServices},
        settings::Model,
    };
    use std::{fs, path::Path};

    const MODEL: &str = r#"
        [project]
        name = "tool"
        version = "2.0.0"
        description = "A tool"
        license = "MIT"

        [release]
        owner = "acme"

        [signing]
        active = "ALWAYS"
        armored = true
        passphrase = "secret"

        [[announce]]
        kind = "log"
        message = "{{projectName}} {{projectVersion}} released"

        [packagers.brew]
        active = "ALWAYS"

        [packagers.scoop]
        active = "ALWAYS"

        [[distributions]]
        name = "tool"
        [[distributions.artifacts]]
        path = "dist/tool-{{projectVersion}}.zip"
    "#;

    #[test]
    fn steps_run_in_canonical_order() {
        let mut steps = vec![WorkflowStep::Publish, WorkflowStep::Checksum, WorkflowStep::Publish];
        steps.sort();
        steps.dedup();
        assert_eq!(steps, vec![WorkflowStep::Checksum, WorkflowStep::Publish]);
        assert!(WorkflowStep::FULL_RELEASE.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn full_release() {
        let dir = tempfile::tempdir().unwrap();
        let recording = RecordingServices::new();
        let ctx = fixture(MODEL, dir.path(), &["dist/tool-2.0.0.zip"], &recording);

        let summary = run_workflow(&ctx, &WorkflowStep::FULL_RELEASE).unwrap();
        assert!(summary.is_success());
        assert!(summary.released);
        assert_eq!(summary.checksum_files.len(), 1);
        assert_eq!(summary.signatures.len(), 2);
        assert_eq!(
            summary.processed,
            vec![
                ("tool".to_string(), PackagerType::Brew),
                ("tool".to_string(), PackagerType::Scoop),
            ]
        );
        assert_eq!(summary.announced, vec!["log"]);

        let checksums = fs::read_to_string(ctx.checksums_directory().join("checksums.txt")).unwrap();
        assert!(checksums.ends_with("  tool-2.0.0.zip\n"));
        assert!(dir.path().join("dist/tool-2.0.0.zip.asc").is_file());

        let journal = recording.journal();
        assert_eq!(journal[0], "sign tool-2.0.0.zip");
        assert!(journal.contains(&"release v2.0.0".to_string()));
        assert!(journal.contains(&"asset v2.0.0 tool-2.0.0.zip".to_string()));
        assert!(journal.contains(&"asset v2.0.0 checksums.txt.asc".to_string()));
        assert!(journal.contains(&"repository acme/homebrew-tap".to_string()));
        assert!(journal.contains(&"repository acme/scoop-bucket".to_string()));
        assert_eq!(journal.last().unwrap(), "announce log tool 2.0.0 released");

        assert!(
            ctx.package_directory("tool", PackagerType::Brew)
                .join("Formula/tool.rb")
                .is_file()
        );
    }

    #[test]
    fn dry_run_touches_nothing_remote() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dist/tool-2.0.0.zip");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "zip").unwrap();
        let recording = RecordingServices::new();
        let ctx = ContextBuilder::new()
            .model(toml::from_str::<Model>(MODEL).unwrap())
            .basedir(dir.path())
            .dry_run(true)
            .services(recording.services())
            .build()
            .unwrap();

        let summary = run_workflow(
            &ctx,
            &[WorkflowStep::Release, WorkflowStep::Publish, WorkflowStep::Announce],
        )
        .unwrap();
        assert!(!summary.released);
        assert!(summary.announced.is_empty());
        assert_eq!(summary.processed.len(), 2);
        assert!(recording.journal().is_empty());
        assert!(recording.runner.commands().is_empty());
    }

    #[test]
    fn packager_filters_limit_the_pairs() {
        let dir = tempfile::tempdir().unwrap();
        let recording = RecordingServices::new();
        let path = dir.path().join("dist/tool-2.0.0.zip");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "zip").unwrap();
        let ctx = ContextBuilder::new()
            .model(toml::from_str::<Model>(MODEL).unwrap())
            .basedir(dir.path())
            .filters(Filters {
                packagers: vec!["scoop".into()],
                ..Default::default()
            })
            .services(recording.services())
            .build()
            .unwrap();

        let summary = run_workflow(&ctx, &[WorkflowStep::Prepare]).unwrap();
        assert_eq!(summary.processed, vec![("tool".to_string(), PackagerType::Scoop)]);
        assert!(!ctx.prepare_directory("tool", PackagerType::Brew).exists());
    }

    #[test]
    fn pairs_without_candidates_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = fixture(
            r#"
            [project]
            name = "tool"
            version = "2.0.0"
            [release]
            owner = "acme"
            [packagers.brew]
            active = "ALWAYS"
            [[distributions]]
            name = "tool"
            [[distributions.artifacts]]
            path = "dist/tool-2.0.0.zip"
            extra_properties = { skipBrew = true }
            "#,
            dir.path(),
            &["dist/tool-2.0.0.zip"],
            &RecordingServices::new(),
        );

        let summary = run_workflow(&ctx, &[WorkflowStep::Prepare]).unwrap();
        assert_eq!(summary.skipped, vec![("tool".to_string(), PackagerType::Brew)]);
        assert!(summary.files.is_empty());
    }

    const FAILING: &str = r#"
        [project]
        name = "tool"
        version = "2.0.0"
        [release]
        owner = "acme"
        [packagers.brew]
        active = "ALWAYS"
        continue_on_error = true
        [[distributions]]
        name = "tool"
        [[distributions.artifacts]]
        path = "dist/tool-2.0.0.zip"
    "#;

    const PACKAGER_STEPS: [WorkflowStep; 3] =
        [WorkflowStep::Prepare, WorkflowStep::Package, WorkflowStep::Publish];

    fn failing_context(dir: &Path, model: &str) -> ReleaseContext {
        let path = dir.join("dist/tool-2.0.0.zip");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "zip").unwrap();
        let recording = RecordingServices::with_runner(RecordingRunner::failing_on("git push"));
        context(model, dir, &recording)
    }

    #[test]
    fn continue_on_error_records_the_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = failing_context(dir.path(), FAILING);

        let summary = run_workflow(&ctx, &PACKAGER_STEPS).unwrap();
        assert!(!summary.is_success());
        assert_eq!(summary.failures.len(), 1);
        let failure = &summary.failures[0];
        assert_eq!(failure.packager, PackagerType::Brew);
        assert_eq!(failure.step, WorkflowStep::Publish);
        assert!(failure.message.starts_with("[brew] tool:"));
        assert!(summary.processed.is_empty());
    }

    #[test]
    fn failure_without_continue_on_error_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let model = FAILING.replace("continue_on_error = true", "continue_on_error = false");
        let ctx = failing_context(dir.path(), &model);

        let err = run_workflow(&ctx, &PACKAGER_STEPS).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolExecution);
        assert!(err.to_string().starts_with("[brew] tool:"));
    }

    #[test]
    fn configuration_errors_ignore_continue_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let model = FAILING.replace("dist/tool-2.0.0.zip", "dist/[tool-2.0.0.zip");
        let ctx = failing_context(dir.path(), &model);

        let err = run_workflow(&ctx, &[WorkflowStep::Prepare]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().starts_with("[brew] tool:"));
    }
}

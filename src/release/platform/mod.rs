//! Packager specific processing.
//!
//! Each packager kind has a [`ToolProcessor`] contributing its own
//! properties, deciding where templates land and how the prepared tree is
//! packaged and published.
//!
//! # Module Organization
//!
//! - [`brew`] - Homebrew formulae and casks
//! - [`chocolatey`] - Chocolatey nuspec packages
//! - [`docker`] - Docker images
//! - [`gofish`] - GoFish food recipes
//! - [`jbang`] - JBang catalogs
//! - [`macports`] - MacPorts Portfiles
//! - [`scoop`] - Scoop manifests
//! - [`sdkman`] - SDKMAN! vendor releases
//! - [`snap`] - Snapcraft packages
//! - [`spec`] - RPM spec files
//! - [`tap`] - Publishing into repository taps

pub mod brew;
pub mod chocolatey;
pub mod docker;
pub mod gofish;
pub mod jbang;
pub mod macports;
pub mod scoop;
pub mod sdkman;
pub mod snap;
pub mod spec;
pub mod tap;

use crate::release::{
    builder::ReleaseContext,
    error::Result,
    props::PropertyContext,
    settings::{Distribution, Packager, PackagerType},
    templates::{self, TemplateSource, collect_templates, trim_tpl},
    utils::fs,
};
use std::path::PathBuf;

/// Borrows the variant configuration of a packager, failing when the packager
/// holds another kind.
macro_rules! variant {
    ($packager:expr, $kind:ident) => {
        match &$packager.kind {
            $crate::release::settings::PackagerKind::$kind(config) => config,
            _ => $crate::bail!(
                "{} is not a {} configuration",
                $packager.name(),
                stringify!($kind)
            ),
        }
    };
}
pub(crate) use variant;

/// Behavior of one packager kind across the prepare, package and publish
/// steps.
pub trait ToolProcessor: Sync {
    fn packager_type(&self) -> PackagerType;

    /// Adds the packager's own keys to `props`. Runs after the artifact keys
    /// are in place and before the extra properties are templated.
    fn fill_props(
        &self,
        ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &mut PropertyContext,
    ) -> Result<()>;

    /// Output path of `template`, relative to the prepare directory. `None`
    /// drops the template.
    fn output_path(&self, _packager: &Packager, _props: &PropertyContext, template: &str) -> Option<PathBuf> {
        Some(PathBuf::from(trim_tpl(template)))
    }

    /// Materializes templates into the prepare directory.
    fn prepare(
        &self,
        ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &PropertyContext,
    ) -> Result<Vec<PathBuf>> {
        prepare_templates(ctx, distribution, packager, props, &|name| {
            self.output_path(packager, props, name)
        })
    }

    /// Copies the prepared tree into the package directory.
    fn package(
        &self,
        ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        _props: &PropertyContext,
    ) -> Result<Vec<PathBuf>> {
        copy_prepared(ctx, distribution, packager)
    }

    /// Pushes the package directory into the packager's tap.
    fn publish(
        &self,
        ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &PropertyContext,
    ) -> Result<()> {
        tap::publish(ctx, distribution, packager, props)
    }
}

/// Renders the packager's templates into a fresh prepare directory.
pub fn prepare_templates(
    ctx: &ReleaseContext,
    distribution: &Distribution,
    packager: &Packager,
    props: &PropertyContext,
    output_path: &dyn Fn(&str) -> Option<PathBuf>,
) -> Result<Vec<PathBuf>> {
    let packager_type = packager.packager_type();
    let source = TemplateSource::resolve(
        ctx.basedir(),
        packager.common.template_directory.as_deref(),
        &distribution.name,
        packager_type,
    );
    log::debug!("reading templates from {:?}", source);
    let templates = collect_templates(&source)?;

    let output = ctx.prepare_directory(&distribution.name, packager_type);
    fs::create_dir_all(&output, true)?;
    templates::materialize(
        templates::engine(),
        &templates,
        props,
        &output,
        &packager.common.skip_templates,
        output_path,
    )
}

/// Replaces the package directory with a copy of the prepare directory and
/// lists the copied files.
pub fn copy_prepared(
    ctx: &ReleaseContext,
    distribution: &Distribution,
    packager: &Packager,
) -> Result<Vec<PathBuf>> {
    let packager_type = packager.packager_type();
    let prepare = ctx.prepare_directory(&distribution.name, packager_type);
    let package = ctx.package_directory(&distribution.name, packager_type);
    fs::create_dir_all(&package, true)?;
    if !prepare.is_dir() {
        log::debug!("nothing prepared in {}", prepare.display());
        return Ok(Vec::new());
    }
    fs::copy_dir(&prepare, &package)?;

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(&package).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

static BREW: brew::BrewProcessor = brew::BrewProcessor;
static CHOCOLATEY: chocolatey::ChocolateyProcessor = chocolatey::ChocolateyProcessor;
static DOCKER: docker::DockerProcessor = docker::DockerProcessor;
static GOFISH: gofish::GofishProcessor = gofish::GofishProcessor;
static JBANG: jbang::JbangProcessor = jbang::JbangProcessor;
static MACPORTS: macports::MacportsProcessor = macports::MacportsProcessor;
static SCOOP: scoop::ScoopProcessor = scoop::ScoopProcessor;
static SDKMAN: sdkman::SdkmanProcessor = sdkman::SdkmanProcessor;
static SNAP: snap::SnapProcessor = snap::SnapProcessor;
static SPEC: spec::SpecProcessor = spec::SpecProcessor;

/// The processor handling `packager_type`.
pub fn processor_for(packager_type: PackagerType) -> &'static dyn ToolProcessor {
    match packager_type {
        PackagerType::Brew => &BREW,
        PackagerType::Chocolatey => &CHOCOLATEY,
        PackagerType::Docker => &DOCKER,
        PackagerType::Gofish => &GOFISH,
        PackagerType::Jbang => &JBANG,
        PackagerType::Macports => &MACPORTS,
        PackagerType::Scoop => &SCOOP,
        PackagerType::Sdkman => &SDKMAN,
        PackagerType::Snap => &SNAP,
        PackagerType::Spec => &SPEC,
    }
}

/// Renders every entry of `templates` against `props`.
pub(crate) fn render_all(name: &str, values: &[String], props: &PropertyContext) -> Result<Vec<String>> {
    values
        .iter()
        .map(|value| templates::render_str(name, value, props))
        .collect()
}

/// Configured `value` when set and not blank, `default` otherwise.
pub(crate) fn or_default(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::release::{
        builder::{context::tests::context, fill::fill_props},
        services::recording::RecordingServices,
    };
    use std::path::Path;

    /// Context, with the artifacts written under `basedir`, for tests that go
    /// through the fill pipeline.
    pub(crate) fn fixture(
        model: &str,
        basedir: &Path,
        artifacts: &[&str],
        recording: &RecordingServices,
    ) -> ReleaseContext {
        for artifact in artifacts {
            let path = basedir.join(artifact);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, artifact.as_bytes()).unwrap();
        }
        context(model, basedir, recording)
    }

    /// Filled props of `packager_type` for the first distribution.
    pub(crate) fn props_for(ctx: &ReleaseContext, packager_type: PackagerType) -> PropertyContext {
        let distribution = &ctx.model().distributions[0];
        let packager = distribution.packagers.get(packager_type).unwrap();
        fill_props(ctx, distribution, packager, processor_for(packager_type)).unwrap()
    }

    #[test]
    fn processors_match_their_type() {
        for packager_type in PackagerType::ALL {
            assert_eq!(processor_for(packager_type).packager_type(), packager_type);
        }
    }

    #[test]
    fn wrong_variant_is_a_tool_error() {
        fn brew_formula(packager: &Packager) -> Result<Option<String>> {
            let brew = variant!(packager, Brew);
            Ok(brew.formula_name.clone())
        }
        let snap = Packager::new(PackagerType::Snap);
        let err = brew_formula(&snap).unwrap_err();
        assert_eq!(err.kind(), crate::release::ErrorKind::ToolExecution);
        assert!(brew_formula(&Packager::new(PackagerType::Brew)).unwrap().is_none());
    }

    #[test]
    fn output_path_defaults_to_trimmed_name() {
        let processor = processor_for(PackagerType::Jbang);
        let packager = Packager::new(PackagerType::Jbang);
        assert_eq!(
            processor.output_path(&packager, &PropertyContext::new(), "jbang-catalog.json.tpl"),
            Some(PathBuf::from("jbang-catalog.json"))
        );
    }
}

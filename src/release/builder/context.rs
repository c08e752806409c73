//! Run context shared by every workflow step.

use super::checksum::ChecksumCache;
use crate::release::{
    error::{Context, ErrorExt, Result},
    props::{PropertyContext, keys},
    services::Services,
    settings::{Model, PackagerType},
    validation::validate_model,
};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Include/exclude filters applied when selecting what to process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub distributions: Vec<String>,
    pub exclude_distributions: Vec<String>,
    pub packagers: Vec<String>,
    pub exclude_packagers: Vec<String>,
}

/// A validated model plus everything a run needs to process it.
///
/// The model is read-only once the context exists.
pub struct ReleaseContext {
    model: Model,
    basedir: PathBuf,
    output_directory: PathBuf,
    dry_run: bool,
    filters: Filters,
    services: Services,
    checksums: ChecksumCache,
    timestamp: String,
}

impl std::fmt::Debug for ReleaseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseContext")
            .field("basedir", &self.basedir)
            .field("output_directory", &self.output_directory)
            .field("dry_run", &self.dry_run)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

impl ReleaseContext {
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn checksums(&self) -> &ChecksumCache {
        &self.checksums
    }

    /// Project, host platform and release service properties, plus the
    /// timestamp taken when the context was built.
    pub fn props(&self) -> Result<PropertyContext> {
        let mut props = self.model.props()?;
        props.put(keys::TIMESTAMP, self.timestamp.as_str());
        self.model
            .release
            .fill_props(&self.model.project, &mut props)?;
        Ok(props)
    }

    /// `<output>/<distribution>/prepare/<packager>`
    pub fn prepare_directory(&self, distribution: &str, packager_type: PackagerType) -> PathBuf {
        self.output_directory
            .join(distribution)
            .join("prepare")
            .join(packager_type.as_str())
    }

    /// `<output>/<distribution>/package/<packager>`
    pub fn package_directory(&self, distribution: &str, packager_type: PackagerType) -> PathBuf {
        self.output_directory
            .join(distribution)
            .join("package")
            .join(packager_type.as_str())
    }

    pub fn checksums_directory(&self) -> PathBuf {
        self.output_directory.join("checksums")
    }

    /// `path` relative to the base directory when it lives below it.
    pub fn relativize(&self, path: &Path) -> String {
        path.strip_prefix(&self.basedir)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}

/// Builder for [`ReleaseContext`].
///
/// Building resolves environment fallbacks and runs the validation pass, so a
/// built context always carries a valid model.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_publish::release::{ContextBuilder, Model};
///
/// # fn example(model: Model) -> kodegen_bundler_publish::release::Result<()> {
/// let context = ContextBuilder::new()
///     .model(model)
///     .basedir(".")
///     .dry_run(true)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ContextBuilder {
    model: Option<Model>,
    basedir: Option<PathBuf>,
    output_directory: Option<PathBuf>,
    dry_run: bool,
    filters: Filters,
    services: Option<Services>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the release model.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    /// Directory artifact paths and template directories are relative to.
    ///
    /// Default: the current directory
    pub fn basedir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.basedir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Directory receiving checksums and packager output. Relative paths are
    /// resolved against the base directory.
    ///
    /// Default: `<basedir>/out/release`
    pub fn output_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Skips every side effect that leaves the machine.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Collaborators used for remote operations.
    ///
    /// Default: [`Services::system`]
    pub fn services(mut self, services: Services) -> Self {
        self.services = Some(services);
        self
    }

    /// Builds the context.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is missing or fails validation.
    pub fn build(self) -> Result<ReleaseContext> {
        let mut model = self.model.context("model is required")?;

        let basedir = match self.basedir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let basedir = basedir
            .absolutize()
            .fs_context("resolving base directory", &basedir)?
            .into_owned();
        let output_directory = match self.output_directory {
            Some(dir) if dir.is_absolute() => dir,
            Some(dir) => basedir.join(dir),
            None => basedir.join("out").join("release"),
        };

        model.resolve_env();
        validate_model(&mut model, &basedir)?;

        let services = match self.services {
            Some(services) => services,
            None => Services::system(&model)?,
        };

        Ok(ReleaseContext {
            model,
            basedir,
            output_directory,
            dry_run: self.dry_run,
            filters: self.filters,
            services,
            checksums: ChecksumCache::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }
}

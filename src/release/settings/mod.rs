//! Declarative release model.
//!
//! The model is deserialized from `release.toml`, completed from the
//! environment, mutated once by the validation pass (inheritance, defaults,
//! enabled flags) and read-only afterwards.

mod active;
mod announce;
mod artifact;
mod brew;
mod checksum;
mod chocolatey;
mod distribution;
mod docker;
pub mod env;
pub mod file_type;
mod gofish;
mod jbang;
mod macports;
mod packager;
pub mod platform;
mod project;
mod release;
mod scoop;
mod sdkman;
mod signing;
mod snap;
mod spec;
mod tap;
mod upload;
mod version;

pub use active::{Active, EnabledState};
pub use announce::AnnouncerConfig;
pub use artifact::{Artifact, compare_by_platform};
pub use brew::{Brew, Cask, CaskItem, Dependency};
pub use checksum::{Algorithm, Checksum};
pub use chocolatey::Chocolatey;
pub use distribution::{Distribution, DistributionType, Executable};
pub use docker::{Docker, DockerRegistry};
pub use gofish::Gofish;
pub use jbang::Jbang;
pub use macports::Macports;
pub use packager::{Packager, PackagerCommon, PackagerConfig, PackagerKind, PackagerType, Packagers};
pub use platform::Platform;
pub use project::{DEFAULT_SNAPSHOT_LABEL, DEFAULT_SNAPSHOT_PATTERN, Java, Project, Snapshot};
pub use release::{ReleaseService, ServiceKind};
pub use scoop::Scoop;
pub use sdkman::{Sdkman, SdkmanCommand};
pub use signing::{Signing, SigningMode};
pub use snap::{Architecture, Plug, Slot, Snap};
pub use spec::Spec;
pub use tap::{CommitAuthor, RepositoryTap};
pub use upload::UploaderConfig;
pub use version::{VersionPattern, VersionPatternKind};

use crate::release::props::{PropertyContext, capitalize};

/// Free-form properties attached to an entity.
pub type ExtraProperties = serde_json::Map<String, serde_json::Value>;

/// Root of the release model.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Model {
    pub project: Project,
    pub release: ReleaseService,
    pub checksum: Checksum,
    pub signing: Signing,
    pub platform: Platform,
    pub upload: Vec<UploaderConfig>,
    pub announce: Vec<AnnouncerConfig>,
    /// Global packager defaults every distribution inherits from.
    pub packagers: Packagers,
    /// Distributions in declared order.
    pub distributions: Vec<Distribution>,
}

impl Model {
    pub fn distribution(&self, name: &str) -> Option<&Distribution> {
        self.distributions.iter().find(|d| d.name == name)
    }

    /// Completes the model from environment variables.
    pub fn resolve_env(&mut self) {
        self.project.resolve_env();
        self.release.resolve_env();
        self.signing.resolve_env();
        for uploader in &mut self.upload {
            uploader.resolve_env();
        }
    }

    /// Properties shared by every distribution: project, versions, host.
    pub fn props(&self) -> crate::release::Result<PropertyContext> {
        let mut props = self.project.props()?;
        props.put_all(&self.platform.props());
        Ok(props)
    }
}

/// Fills an unset option from `parent`.
pub(crate) fn inherit<T: Clone>(child: &mut Option<T>, parent: &Option<T>) {
    if child.is_none() {
        child.clone_from(parent);
    }
}

/// Like [`inherit`] but also replaces blank strings.
pub(crate) fn inherit_text(child: &mut Option<String>, parent: &Option<String>) {
    if child.as_deref().is_none_or(|c| c.trim().is_empty()) {
        if let Some(parent) = parent.as_deref().filter(|p| !p.trim().is_empty()) {
            *child = Some(parent.to_string());
        }
    }
}

/// Appends parent entries missing from `child`, keeping child order first.
pub(crate) fn inherit_list(child: &mut Vec<String>, parent: &[String]) {
    for entry in parent {
        if !child.contains(entry) {
            child.push(entry.clone());
        }
    }
}

/// Layers `child` over `parent`. Child values win on shared keys.
pub(crate) fn merge_extra_properties(child: &mut ExtraProperties, parent: &ExtraProperties) {
    let mut merged = parent.clone();
    for (key, value) in child.iter() {
        merged.insert(key.clone(), value.clone());
    }
    *child = merged;
}

/// Extra properties exposed as `<prefix><Key>`. An empty prefix keeps keys.
pub(crate) fn prefixed_properties(prefix: &str, extra: &ExtraProperties) -> PropertyContext {
    extra
        .iter()
        .map(|(key, value)| {
            let key = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}", prefix, capitalize(key))
            };
            (key, value.clone())
        })
        .collect()
}

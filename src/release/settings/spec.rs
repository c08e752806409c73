//! RPM spec settings.

use super::{
    DistributionType, PackagerConfig, PackagerType, RepositoryTap, inherit_list, inherit_text,
    platform::{is_alpine_linux, is_intel, is_linux},
};

const ARCHIVES: &[&str] = &[
    ".tar.bz2", ".tar.gz", ".tar.xz", ".tbz2", ".tgz", ".txz", ".tar", ".zip",
];

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Spec {
    pub package_name: Option<String>,
    /// RPM `Release:` field.
    pub release: Option<String>,
    pub requires: Vec<String>,
    #[serde(alias = "repository")]
    pub tap: RepositoryTap,
}

impl Spec {
    pub fn release(&self) -> &str {
        self.release
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or("1")
    }
}

impl PackagerConfig for Spec {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Spec
    }

    fn supported_extensions(&self, distribution_type: DistributionType) -> &'static [&'static str] {
        match distribution_type {
            DistributionType::NativePackage | DistributionType::SingleJar => &[],
            _ => ARCHIVES,
        }
    }

    fn supports_platform(&self, platform: &str) -> bool {
        platform.is_empty() || (is_linux(platform) && is_intel(platform) && !is_alpine_linux(platform))
    }

    fn tap(&self) -> Option<&RepositoryTap> {
        Some(&self.tap)
    }

    fn tap_mut(&mut self) -> Option<&mut RepositoryTap> {
        Some(&mut self.tap)
    }

    fn merge_from(&mut self, parent: &Self) {
        inherit_text(&mut self.package_name, &parent.package_name);
        inherit_text(&mut self.release, &parent.release);
        inherit_list(&mut self.requires, &parent.requires);
        self.tap.merge_from(&parent.tap);
    }
}

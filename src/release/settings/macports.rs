//! MacPorts settings.

use super::{
    DistributionType, PackagerConfig, PackagerType, RepositoryTap, inherit, inherit_list,
    inherit_text, platform::is_mac,
};

const ZIP: &[&str] = &[".zip"];

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Macports {
    pub package_name: Option<String>,
    pub revision: Option<u32>,
    pub categories: Vec<String>,
    /// Defaults to the project maintainers.
    pub maintainers: Vec<String>,
    #[serde(alias = "repository")]
    pub tap: RepositoryTap,
}

impl Macports {
    pub fn revision(&self) -> u32 {
        self.revision.unwrap_or(0)
    }

    /// First category decides where the Portfile lives.
    pub fn primary_category(&self) -> &str {
        self.categories.first().map(String::as_str).unwrap_or("devel")
    }
}

impl PackagerConfig for Macports {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Macports
    }

    fn supported_extensions(&self, distribution_type: DistributionType) -> &'static [&'static str] {
        match distribution_type {
            DistributionType::NativePackage | DistributionType::SingleJar => &[],
            _ => ZIP,
        }
    }

    fn supports_platform(&self, platform: &str) -> bool {
        platform.is_empty() || is_mac(platform)
    }

    fn tap(&self) -> Option<&RepositoryTap> {
        Some(&self.tap)
    }

    fn tap_mut(&mut self) -> Option<&mut RepositoryTap> {
        Some(&mut self.tap)
    }

    fn merge_from(&mut self, parent: &Self) {
        inherit_text(&mut self.package_name, &parent.package_name);
        inherit(&mut self.revision, &parent.revision);
        if self.categories.is_empty() {
            self.categories.clone_from(&parent.categories);
        }
        inherit_list(&mut self.maintainers, &parent.maintainers);
        self.tap.merge_from(&parent.tap);
    }
}

//! Scoop manifest settings.

use super::{
    DistributionType, PackagerConfig, PackagerType, RepositoryTap, inherit_text,
    platform::is_windows,
};

const ZIP: &[&str] = &[".zip"];
const MSI: &[&str] = &[".msi"];

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Scoop {
    pub package_name: Option<String>,
    /// Defaults to the latest release URL.
    pub checkver_url: Option<String>,
    /// Defaults to the download URL with the version replaced by `$version`.
    pub autoupdate_url: Option<String>,
    #[serde(alias = "bucket", alias = "repository")]
    pub tap: RepositoryTap,
}

impl PackagerConfig for Scoop {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Scoop
    }

    fn supported_extensions(&self, distribution_type: DistributionType) -> &'static [&'static str] {
        match distribution_type {
            DistributionType::NativePackage => MSI,
            DistributionType::SingleJar => &[],
            _ => ZIP,
        }
    }

    fn supports_platform(&self, platform: &str) -> bool {
        platform.is_empty() || is_windows(platform)
    }

    fn tap(&self) -> Option<&RepositoryTap> {
        Some(&self.tap)
    }

    fn tap_mut(&mut self) -> Option<&mut RepositoryTap> {
        Some(&mut self.tap)
    }

    fn merge_from(&mut self, parent: &Self) {
        inherit_text(&mut self.package_name, &parent.package_name);
        inherit_text(&mut self.checkver_url, &parent.checkver_url);
        inherit_text(&mut self.autoupdate_url, &parent.autoupdate_url);
        self.tap.merge_from(&parent.tap);
    }
}

//! GoFish food settings.

use super::{
    DistributionType, PackagerConfig, PackagerType, RepositoryTap,
    platform::{is_linux, is_mac, is_windows},
};

const ARCHIVES: &[&str] = &[".zip", ".tar.gz"];

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Gofish {
    #[serde(alias = "repository")]
    pub tap: RepositoryTap,
}

impl PackagerConfig for Gofish {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Gofish
    }

    fn supported_extensions(&self, distribution_type: DistributionType) -> &'static [&'static str] {
        match distribution_type {
            DistributionType::NativePackage | DistributionType::SingleJar => &[],
            _ => ARCHIVES,
        }
    }

    fn supports_platform(&self, platform: &str) -> bool {
        platform.is_empty() || is_mac(platform) || is_linux(platform) || is_windows(platform)
    }

    fn tap(&self) -> Option<&RepositoryTap> {
        Some(&self.tap)
    }

    fn tap_mut(&mut self) -> Option<&mut RepositoryTap> {
        Some(&mut self.tap)
    }

    fn merge_from(&mut self, parent: &Self) {
        self.tap.merge_from(&parent.tap);
    }
}

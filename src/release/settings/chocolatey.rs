//! Chocolatey settings.

use super::{
    DistributionType, PackagerConfig, PackagerType, RepositoryTap, env, inherit, inherit_text,
    platform::is_windows,
};

pub const DEFAULT_SOURCE: &str = "https://push.chocolatey.org/";

const ZIP: &[&str] = &[".zip"];
const MSI: &[&str] = &[".msi"];

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Chocolatey {
    pub package_name: Option<String>,
    pub username: Option<String>,
    pub api_key: Option<String>,
    pub title: Option<String>,
    pub icon_url: Option<String>,
    pub source: Option<String>,
    /// Let a CI workflow in the bucket repository build and push the package.
    pub remote_build: Option<bool>,
    #[serde(alias = "bucket", alias = "repository")]
    pub tap: RepositoryTap,
}

impl Chocolatey {
    pub fn resolve_env(&mut self) {
        self.api_key = env::resolve("chocolatey_api_key", self.api_key.as_deref());
    }

    pub fn is_remote_build(&self) -> bool {
        self.remote_build.unwrap_or(false)
    }

    pub fn source(&self) -> &str {
        self.source
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SOURCE)
    }
}

impl PackagerConfig for Chocolatey {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Chocolatey
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
        inherit_text(&mut self.username, &parent.username);
        inherit_text(&mut self.api_key, &parent.api_key);
        inherit_text(&mut self.title, &parent.title);
        inherit_text(&mut self.icon_url, &parent.icon_url);
        inherit_text(&mut self.source, &parent.source);
        inherit(&mut self.remote_build, &parent.remote_build);
        self.tap.merge_from(&parent.tap);
    }
}

//! JBang catalog settings.

use super::{DistributionType, PackagerConfig, PackagerType, RepositoryTap, inherit_text};

const JAVA_ARCHIVES: &[&str] = &[".zip", ".tar", ".tar.gz", ".tgz"];
const JAR: &[&str] = &[".jar"];

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Jbang {
    /// Catalog alias, the distribution name by default.
    pub alias: Option<String>,
    #[serde(alias = "catalog", alias = "repository")]
    pub tap: RepositoryTap,
}

impl PackagerConfig for Jbang {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Jbang
    }

    fn supported_extensions(&self, distribution_type: DistributionType) -> &'static [&'static str] {
        match distribution_type {
            DistributionType::JavaBinary => JAVA_ARCHIVES,
            DistributionType::SingleJar => JAR,
            _ => &[],
        }
    }

    fn supports_platform(&self, _platform: &str) -> bool {
        true
    }

    fn supports_snapshot(&self) -> bool {
        true
    }

    fn tap(&self) -> Option<&RepositoryTap> {
        Some(&self.tap)
    }

    fn tap_mut(&mut self) -> Option<&mut RepositoryTap> {
        Some(&mut self.tap)
    }

    fn merge_from(&mut self, parent: &Self) {
        inherit_text(&mut self.alias, &parent.alias);
        self.tap.merge_from(&parent.tap);
    }
}

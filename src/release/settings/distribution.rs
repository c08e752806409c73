//! Distributions: named families of artifacts released together.

use super::{
    Active, Artifact, EnabledState, ExtraProperties, Packagers, Platform, prefixed_properties,
    project::{Java, Project},
};
use crate::release::props::{PropertyContext, keys};
use serde_json::Value;
use std::{fmt, str::FromStr};

/// Kind of payload a distribution ships.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum DistributionType {
    #[default]
    Binary,
    JavaBinary,
    Jlink,
    NativeImage,
    NativePackage,
    SingleJar,
}

impl DistributionType {
    pub const ALL: [DistributionType; 6] = [
        DistributionType::Binary,
        DistributionType::JavaBinary,
        DistributionType::Jlink,
        DistributionType::NativeImage,
        DistributionType::NativePackage,
        DistributionType::SingleJar,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DistributionType::Binary => "BINARY",
            DistributionType::JavaBinary => "JAVA_BINARY",
            DistributionType::Jlink => "JLINK",
            DistributionType::NativeImage => "NATIVE_IMAGE",
            DistributionType::NativePackage => "NATIVE_PACKAGE",
            DistributionType::SingleJar => "SINGLE_JAR",
        }
    }

    /// Distributions that need a JVM at runtime.
    pub fn is_java(self) -> bool {
        matches!(
            self,
            DistributionType::JavaBinary | DistributionType::Jlink | DistributionType::SingleJar
        )
    }
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistributionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        DistributionType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| format!("unknown distribution type `{}`", s))
    }
}

impl TryFrom<String> for DistributionType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Launcher installed by packagers.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Executable {
    pub name: Option<String>,
    pub unix_extension: Option<String>,
    pub windows_extension: Option<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Distribution {
    pub name: String,
    #[serde(rename = "type")]
    pub distribution_type: DistributionType,
    pub executable: Executable,
    pub artifacts: Vec<Artifact>,
    pub tags: Vec<String>,
    pub java: Java,
    pub platform: Platform,
    pub active: Option<Active>,
    #[serde(skip)]
    pub enabled: EnabledState,
    pub extra_properties: ExtraProperties,
    /// Per-distribution packager sections, layered over the global ones.
    pub packagers: Packagers,
}

impl Distribution {
    /// Distributions default to `ALWAYS`.
    pub fn resolve_enabled(&mut self, project: &Project) -> bool {
        let active = *self.active.get_or_insert(Active::Always);
        self.enabled.resolve(|| active.check(project))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.is_enabled()
    }

    pub fn executable_name(&self) -> &str {
        self.executable
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.name)
    }

    pub fn unix_executable(&self) -> String {
        match self.executable.unix_extension.as_deref().filter(|e| !e.is_empty()) {
            Some(ext) => format!("{}.{}", self.executable_name(), ext.trim_start_matches('.')),
            None => self.executable_name().to_string(),
        }
    }

    /// Windows launcher: `.bat` for JVM distributions, `.exe` otherwise.
    pub fn windows_executable(&self) -> String {
        let default = if self.distribution_type.is_java() { "bat" } else { "exe" };
        let ext = self
            .executable
            .windows_extension
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(default);
        format!("{}.{}", self.executable_name(), ext.trim_start_matches('.'))
    }

    /// Distribution scoped properties.
    pub fn props(&self) -> PropertyContext {
        let mut props = PropertyContext::new();
        props.put(keys::DISTRIBUTION_NAME, self.name.as_str());
        props.put(keys::DISTRIBUTION_TYPE, self.distribution_type.as_str());
        props.put(keys::DISTRIBUTION_EXECUTABLE, self.executable_name());
        props.put("distributionExecutableUnix", self.unix_executable());
        props.put("distributionExecutableWindows", self.windows_executable());
        props.put("distributionTagsBySpace", self.tags.join(" "));
        props.put("distributionTagsByComma", self.tags.join(","));
        self.java.fill_props("distribution", &mut props);
        props.put(
            "distributionPlatformReplacements",
            Value::Object(self.platform.replacements.clone()),
        );
        props.put_all(&prefixed_properties("distribution", &self.extra_properties));
        props
    }

    #[cfg(test)]
    pub(crate) fn for_tests(name: &str, distribution_type: DistributionType, artifacts: Vec<Artifact>) -> Self {
        Self {
            name: name.to_string(),
            distribution_type,
            artifacts,
            ..Default::default()
        }
    }
}

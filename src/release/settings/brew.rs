//! Homebrew formula and cask settings.

use super::{
    DistributionType, PackagerConfig, PackagerType, RepositoryTap, inherit, inherit_text,
    platform::{is_alpine_linux, is_linux, is_mac},
};
use crate::release::{
    error::Result,
    props::{PropertyContext, class_name},
    templates,
};
use std::fmt;

/// A formula dependency rendered as `depends_on`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Dependency {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl Dependency {
    pub fn new(key: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            key: key.into(),
            value: value.map(str::to_string),
        }
    }

    /// Value with blanks and `"null"` treated as absent.
    pub fn value(&self) -> Option<&str> {
        self.value
            .as_deref()
            .filter(|v| !v.trim().is_empty() && !v.eq_ignore_ascii_case("null"))
    }
}

impl fmt::Display for Dependency {
    /// `:java` stays a symbol, anything else is quoted: `"openjdk@17" => "build"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.starts_with(':') {
            f.write_str(&self.key)?;
        } else {
            write!(f, "\"{}\"", self.key)?;
        }
        if let Some(value) = self.value() {
            write!(f, " => \"{}\"", value)?;
        }
        Ok(())
    }
}

/// Named list of paths for a cask `uninstall` or `zap` stanza.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct CaskItem {
    pub name: String,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Cask {
    pub enabled: Option<bool>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub pkg_name: Option<String>,
    pub app_name: Option<String>,
    pub appcast: Option<String>,
    pub uninstall: Vec<CaskItem>,
    pub zap: Vec<CaskItem>,
}

impl Cask {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    pub fn is_enabled_set(&self) -> bool {
        self.enabled.is_some()
    }

    pub fn enable(&mut self) {
        self.enabled = Some(true);
    }

    pub fn disable(&mut self) {
        self.enabled = Some(false);
    }

    pub fn merge_from(&mut self, parent: &Cask) {
        inherit(&mut self.enabled, &parent.enabled);
        inherit_text(&mut self.name, &parent.name);
        inherit_text(&mut self.display_name, &parent.display_name);
        inherit_text(&mut self.pkg_name, &parent.pkg_name);
        inherit_text(&mut self.app_name, &parent.app_name);
        inherit_text(&mut self.appcast, &parent.appcast);
        merge_items(&mut self.uninstall, &parent.uninstall);
        merge_items(&mut self.zap, &parent.zap);
    }
}

/// Items merge by name. Shared names get the union of both path lists.
fn merge_items(child: &mut Vec<CaskItem>, parent: &[CaskItem]) {
    let mut merged: Vec<CaskItem> = Vec::new();
    for item in parent {
        let mut entry = item.clone();
        if let Some(own) = child.iter().find(|c| c.name == item.name) {
            for path in &own.items {
                if !entry.items.contains(path) {
                    entry.items.push(path.clone());
                }
            }
        }
        merged.push(entry);
    }
    for item in child.iter() {
        if !merged.iter().any(|m| m.name == item.name) {
            merged.push(item.clone());
        }
    }
    *child = merged;
}

const ZIP: &[&str] = &[".zip"];
const NATIVE_PACKAGES: &[&str] = &[".zip", ".dmg", ".pkg"];
const JAR: &[&str] = &[".jar"];

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Brew {
    /// Defaults to the distribution name. Rendered as a Ruby class name.
    pub formula_name: Option<String>,
    pub multi_platform: Option<bool>,
    pub dependencies: Vec<Dependency>,
    pub livecheck: Vec<String>,
    pub cask: Cask,
    #[serde(alias = "repository")]
    pub tap: RepositoryTap,
}

impl Brew {
    pub fn is_multi_platform(&self) -> bool {
        self.multi_platform.unwrap_or(false)
    }

    /// Formula name rendered against `props` and turned into a Ruby class
    /// name. Falls back to the distribution name.
    pub fn resolved_formula_name(&self, distribution: &str, props: &PropertyContext) -> Result<String> {
        let name = self
            .formula_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(distribution);
        let rendered = templates::render_str("brew formula name", name, props)?;
        Ok(class_name(&rendered))
    }
}

impl PackagerConfig for Brew {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Brew
    }

    fn supported_extensions(&self, distribution_type: DistributionType) -> &'static [&'static str] {
        match distribution_type {
            DistributionType::NativePackage => NATIVE_PACKAGES,
            DistributionType::SingleJar => JAR,
            _ => ZIP,
        }
    }

    fn supports_platform(&self, platform: &str) -> bool {
        if self.is_multi_platform() {
            return (platform.is_empty() || is_mac(platform) || is_linux(platform))
                && !is_alpine_linux(platform);
        }
        platform.is_empty() || is_mac(platform)
    }

    fn tap(&self) -> Option<&RepositoryTap> {
        Some(&self.tap)
    }

    fn tap_mut(&mut self) -> Option<&mut RepositoryTap> {
        Some(&mut self.tap)
    }

    fn merge_from(&mut self, parent: &Self) {
        inherit_text(&mut self.formula_name, &parent.formula_name);
        inherit(&mut self.multi_platform, &parent.multi_platform);
        let mut dependencies: Vec<Dependency> = parent
            .dependencies
            .iter()
            .map(|dep| {
                self.dependencies
                    .iter()
                    .find(|own| own.key == dep.key)
                    .unwrap_or(dep)
                    .clone()
            })
            .collect();
        for dep in &self.dependencies {
            if !dependencies.iter().any(|d| d.key == dep.key) {
                dependencies.push(dep.clone());
            }
        }
        self.dependencies = dependencies;
        if self.livecheck.is_empty() {
            self.livecheck.clone_from(&parent.livecheck);
        }
        self.cask.merge_from(&parent.cask);
        self.tap.merge_from(&parent.tap);
    }
}

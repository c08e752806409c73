//! Platform tags and replacement tables.
//!
//! Platform tags are free-form `os-arch` strings such as `osx-x86_64` or
//! `linux_musl-aarch_64`. The predicates below classify them the way the
//! packager filters need.

use super::ExtraProperties;
use crate::release::props::PropertyContext;

/// Returns `true` for a missing or blank tag.
pub fn is_blank(platform: Option<&str>) -> bool {
    platform.is_none_or(|p| p.trim().is_empty())
}

fn os_part(platform: &str) -> &str {
    platform.split('-').next().unwrap_or_default()
}

pub fn is_mac(platform: &str) -> bool {
    let os = os_part(platform);
    os.starts_with("osx") || os.starts_with("mac") || os.starts_with("darwin")
}

pub fn is_linux(platform: &str) -> bool {
    os_part(platform).starts_with("linux")
}

/// Musl or Alpine based Linux.
pub fn is_alpine_linux(platform: &str) -> bool {
    let os = os_part(platform);
    os.starts_with("linux") && (os.contains("musl") || os.contains("alpine"))
}

pub fn is_windows(platform: &str) -> bool {
    let os = os_part(platform);
    os.starts_with("windows") || os == "win"
}

pub fn is_intel(platform: &str) -> bool {
    platform
        .split_once('-')
        .map(|(_, arch)| matches!(arch, "x86_64" | "x86_32" | "x86" | "amd64" | "i386" | "i686"))
        .unwrap_or(false)
}

pub fn is_arm(platform: &str) -> bool {
    platform
        .split_once('-')
        .map(|(_, arch)| arch.starts_with("aarch") || arch.starts_with("arm"))
        .unwrap_or(false)
}

/// Splits `os-arch` into its two parts. Tags without exactly one hyphen yield
/// empty strings.
pub fn split_os_arch(platform: &str) -> (String, String) {
    let parts: Vec<&str> = platform.split('-').collect();
    match parts.as_slice() {
        [os, arch] if !os.is_empty() && !arch.is_empty() => (os.to_string(), arch.to_string()),
        _ => (String::new(), String::new()),
    }
}

/// Normalized tag of the machine running the release.
pub fn current() -> String {
    let os = match std::env::consts::OS {
        "macos" => "osx",
        other => other,
    };
    let arch = match std::env::consts::ARCH {
        "aarch64" => "aarch_64",
        "x86" => "x86_32",
        other => other,
    };
    format!("{}-{}", os, arch)
}

/// Replacement table applied to platform tags before they reach templates.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Platform {
    pub replacements: ExtraProperties,
}

impl Platform {
    /// Layers this table on top of `parent`. Own entries win.
    pub fn merge_from(&mut self, parent: &Platform) {
        let mut merged = parent.replacements.clone();
        for (key, value) in &self.replacements {
            merged.insert(key.clone(), value.clone());
        }
        self.replacements = merged;
    }

    /// Applies the table to `platform`.
    ///
    /// An entry keyed by the whole tag wins. Otherwise each hyphen separated
    /// segment equal to a key is substituted.
    pub fn apply_replacements(&self, platform: &str) -> String {
        if platform.is_empty() {
            return String::new();
        }
        if let Some(whole) = self.replacement(platform) {
            return whole.to_string();
        }
        platform
            .split('-')
            .map(|segment| self.replacement(segment).unwrap_or(segment))
            .collect::<Vec<_>>()
            .join("-")
    }

    fn replacement(&self, key: &str) -> Option<&str> {
        self.replacements.get(key).and_then(|v| v.as_str())
    }

    /// Properties describing the current machine.
    pub fn props(&self) -> PropertyContext {
        let platform = current();
        let (os, arch) = split_os_arch(&platform);
        let mut props = PropertyContext::new();
        props.put("osName", os);
        props.put("osArch", arch);
        props.put("osPlatformReplaced", self.apply_replacements(&platform));
        props.put("osPlatform", platform);
        props
    }
}

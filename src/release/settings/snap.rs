//! Snapcraft settings.

use super::{
    DistributionType, ExtraProperties, PackagerConfig, PackagerType, RepositoryTap, inherit,
    inherit_list, inherit_text,
    platform::{is_alpine_linux, is_linux},
};

/// A snap plug with free-form attributes.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Plug {
    pub name: String,
    pub attributes: ExtraProperties,
}

/// A snap slot. `read` and `write` feed the content interface.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Slot {
    pub name: String,
    pub attributes: ExtraProperties,
    pub read: Vec<String>,
    pub write: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Architecture {
    pub build_on: Vec<String>,
    pub run_on: Vec<String>,
    pub ignore_error: bool,
}

impl Architecture {
    pub fn has_build_on(&self) -> bool {
        !self.build_on.is_empty()
    }
}

/// Anything merged by name with child attributes layered on top.
trait Named: Clone {
    fn name(&self) -> &str;
    fn layer(&mut self, child: &Self);
}

impl Named for Plug {
    fn name(&self) -> &str {
        &self.name
    }

    fn layer(&mut self, child: &Self) {
        for (key, value) in &child.attributes {
            self.attributes.insert(key.clone(), value.clone());
        }
    }
}

impl Named for Slot {
    fn name(&self) -> &str {
        &self.name
    }

    fn layer(&mut self, child: &Self) {
        for (key, value) in &child.attributes {
            self.attributes.insert(key.clone(), value.clone());
        }
        inherit_list(&mut self.read, &child.read);
        inherit_list(&mut self.write, &child.write);
    }
}

fn merge_named<T: Named>(child: &mut Vec<T>, parent: &[T]) {
    let mut merged: Vec<T> = parent.to_vec();
    for own in child.iter() {
        match merged.iter_mut().find(|m| m.name() == own.name()) {
            Some(entry) => entry.layer(own),
            None => merged.push(own.clone()),
        }
    }
    *child = merged;
}

const ARCHIVES: &[&str] = &[".tar.gz", ".tgz", ".tar"];

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Snap {
    pub package_name: Option<String>,
    pub base: Option<String>,
    pub grade: Option<String>,
    pub confinement: Option<String>,
    /// File holding credentials exported with `snapcraft export-login`.
    pub exported_login: Option<String>,
    pub remote_build: Option<bool>,
    pub local_plugs: Vec<String>,
    pub local_slots: Vec<String>,
    pub plugs: Vec<Plug>,
    pub slots: Vec<Slot>,
    pub architectures: Vec<Architecture>,
    #[serde(alias = "snap", alias = "repository")]
    pub tap: RepositoryTap,
}

impl Snap {
    pub fn is_remote_build(&self) -> bool {
        self.remote_build.unwrap_or(false)
    }
}

impl PackagerConfig for Snap {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Snap
    }

    fn supported_extensions(&self, distribution_type: DistributionType) -> &'static [&'static str] {
        match distribution_type {
            DistributionType::NativePackage | DistributionType::SingleJar => &[],
            _ => ARCHIVES,
        }
    }

    fn supports_platform(&self, platform: &str) -> bool {
        platform.is_empty() || (is_linux(platform) && !is_alpine_linux(platform))
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
        inherit_text(&mut self.package_name, &parent.package_name);
        inherit_text(&mut self.base, &parent.base);
        inherit_text(&mut self.grade, &parent.grade);
        inherit_text(&mut self.confinement, &parent.confinement);
        inherit_text(&mut self.exported_login, &parent.exported_login);
        inherit(&mut self.remote_build, &parent.remote_build);
        inherit_list(&mut self.local_plugs, &parent.local_plugs);
        inherit_list(&mut self.local_slots, &parent.local_slots);
        merge_named(&mut self.plugs, &parent.plugs);
        merge_named(&mut self.slots, &parent.slots);
        for arch in &parent.architectures {
            if !self.architectures.iter().any(|a| a.build_on == arch.build_on) {
                self.architectures.push(arch.clone());
            }
        }
        self.tap.merge_from(&parent.tap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn plug(name: &str, attrs: &[(&str, &str)]) -> Plug {
        Plug {
            name: name.into(),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), Value::from(*v)))
                .collect(),
        }
    }

    #[test]
    fn plugs_layer_child_attributes() {
        let parent = Snap {
            plugs: vec![
                plug("dot-config", &[("interface", "personal-files"), ("read", "$HOME/.a")]),
                plug("network", &[]),
            ],
            ..Default::default()
        };
        let mut child = Snap {
            plugs: vec![plug("dot-config", &[("read", "$HOME/.b")]), plug("home", &[])],
            ..Default::default()
        };
        child.merge_from(&parent);

        let names: Vec<&str> = child.plugs.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["dot-config", "network", "home"]);
        assert_eq!(child.plugs[0].attributes["interface"], "personal-files");
        assert_eq!(child.plugs[0].attributes["read"], "$HOME/.b");

        let once = child.plugs.clone();
        child.merge_from(&parent);
        assert_eq!(child.plugs, once);
    }

    #[test]
    fn architectures_merge_by_build_on() {
        let amd64 = Architecture {
            build_on: vec!["amd64".into()],
            ..Default::default()
        };
        let parent = Snap {
            architectures: vec![amd64.clone()],
            ..Default::default()
        };
        let mut child = Snap {
            architectures: vec![Architecture {
                build_on: vec!["amd64".into()],
                ignore_error: true,
                ..Default::default()
            }],
            ..Default::default()
        };
        child.merge_from(&parent);
        assert_eq!(child.architectures.len(), 1);
        assert!(child.architectures[0].ignore_error);
    }

    #[test]
    fn linux_only_without_musl() {
        let snap = Snap::default();
        assert!(snap.supports_platform(""));
        assert!(snap.supports_platform("linux-x86_64"));
        assert!(!snap.supports_platform("linux_musl-x86_64"));
        assert!(!snap.supports_platform("osx-x86_64"));
        assert!(!snap.supports_distribution(DistributionType::SingleJar));
    }
}

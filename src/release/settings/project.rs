//! Project metadata, versioning and snapshot detection.

use super::{ExtraProperties, env, prefixed_properties, version::VersionPattern};
use crate::release::{
    error::{Result, ValidationErrors},
    props::{PropertyContext, capitalize, keys},
    templates,
};
use regex::Regex;

pub const DEFAULT_SNAPSHOT_PATTERN: &str = ".*-SNAPSHOT";
pub const DEFAULT_SNAPSHOT_LABEL: &str = "early-access";

/// Snapshot detection settings.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Regex matched against the whole version string.
    pub pattern: Option<String>,
    /// Label used as effective version for snapshots. May contain templates.
    pub label: Option<String>,
    /// Explicit override of pattern matching.
    pub enabled: Option<bool>,
}

/// Java coordinates shared by JVM-based distributions.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Java {
    pub version: Option<String>,
    pub main_class: Option<String>,
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
}

impl Java {
    /// Fills unset fields from `parent`.
    pub fn inherit(&mut self, parent: &Java) {
        super::inherit_text(&mut self.version, &parent.version);
        super::inherit_text(&mut self.main_class, &parent.main_class);
        super::inherit_text(&mut self.group_id, &parent.group_id);
        super::inherit_text(&mut self.artifact_id, &parent.artifact_id);
    }

    pub(crate) fn fill_props(&self, prefix: &str, props: &mut PropertyContext) {
        let fields = [
            ("JavaVersion", &self.version),
            ("JavaMainClass", &self.main_class),
            ("JavaGroupId", &self.group_id),
            ("JavaArtifactId", &self.artifact_id),
        ];
        for (suffix, value) in fields {
            if let Some(value) = value {
                props.put(format!("{}{}", prefix, suffix), value.as_str());
            }
        }
    }
}

/// The project being released.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: Option<String>,
    pub version: Option<String>,
    pub version_pattern: VersionPattern,
    pub snapshot: Snapshot,
    pub prerelease: Option<bool>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    pub website: Option<String>,
    pub docs_url: Option<String>,
    pub license: Option<String>,
    pub license_url: Option<String>,
    pub copyright: Option<String>,
    pub vendor: Option<String>,
    pub authors: Vec<String>,
    pub tags: Vec<String>,
    pub maintainers: Vec<String>,
    pub java: Java,
    pub extra_properties: ExtraProperties,
}

impl Project {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or_default()
    }

    /// Completes unset fields from `KODEGEN_PROJECT_*` variables.
    pub fn resolve_env(&mut self) {
        self.name = env::resolve("project_name", self.name.as_deref());
        self.version = env::resolve("project_version", self.version.as_deref());
        self.snapshot.pattern =
            env::resolve("project_snapshot_pattern", self.snapshot.pattern.as_deref());
        self.snapshot.label = env::resolve("project_snapshot_label", self.snapshot.label.as_deref());
    }

    pub fn snapshot_pattern(&self) -> &str {
        self.snapshot
            .pattern
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_SNAPSHOT_PATTERN)
    }

    pub fn snapshot_label(&self) -> &str {
        self.snapshot
            .label
            .as_deref()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(DEFAULT_SNAPSHOT_LABEL)
    }

    /// Whether this run releases a snapshot.
    pub fn is_snapshot(&self) -> bool {
        if let Some(enabled) = self.snapshot.enabled {
            return enabled;
        }
        match Regex::new(&format!("^(?:{})$", self.snapshot_pattern())) {
            Ok(re) => re.is_match(self.version()),
            Err(_) => false,
        }
    }

    /// Whether this run releases a prerelease. Explicit flag first, then the
    /// prerelease component of the parsed version.
    pub fn is_prerelease(&self) -> bool {
        if let Some(prerelease) = self.prerelease {
            return prerelease;
        }
        self.version_pattern
            .parse(self.version())
            .map(|props| props.contains_key("versionTag") || props.contains_key("versionPrerelease"))
            .unwrap_or(false)
    }

    /// Checks required fields and the version against its pattern.
    pub fn validate(&self, errors: &mut ValidationErrors) {
        if self.name().trim().is_empty() {
            errors.configuration("project.name must not be blank");
        }
        if self.version().trim().is_empty() {
            errors.configuration("project.version must not be blank");
            return;
        }
        if let Err(e) = Regex::new(&format!("^(?:{})$", self.snapshot_pattern())) {
            errors.configuration(format!("project.snapshot.pattern is invalid: {}", e));
        }
        if let Err(e) = self.version_pattern.parse(self.version()) {
            errors.configuration(format!(
                "project.version does not follow {}: {}",
                self.version_pattern, e
            ));
        }
    }

    /// Project-level properties shared by every template.
    pub fn props(&self) -> Result<PropertyContext> {
        let mut props = PropertyContext::new();
        props.put(keys::PROJECT_NAME, self.name());
        props.put(keys::PROJECT_NAME_CAPITALIZED, capitalize(self.name()));
        props.put(keys::PROJECT_VERSION, self.version());
        props.put(keys::PROJECT_SNAPSHOT, self.is_snapshot());

        let optional = [
            ("projectDescription", &self.description),
            ("projectLongDescription", &self.long_description),
            ("projectWebsite", &self.website),
            ("projectDocsUrl", &self.docs_url),
            ("projectLicense", &self.license),
            ("projectLicenseUrl", &self.license_url),
            ("projectCopyright", &self.copyright),
            ("projectVendor", &self.vendor),
        ];
        for (key, value) in optional {
            props.put(key, value.clone().unwrap_or_default());
        }
        props.put("projectAuthorsBySpace", self.authors.join(" "));
        props.put("projectAuthorsByComma", self.authors.join(","));
        props.put("projectTagsBySpace", self.tags.join(" "));
        props.put("projectTagsByComma", self.tags.join(","));
        self.java.fill_props("project", &mut props);

        if let Ok(version_props) = self.version_pattern.parse(self.version()) {
            props.put_all(&version_props);
        }
        props.put_all(&prefixed_properties("project", &self.extra_properties));

        let effective = if self.is_snapshot() {
            templates::render_str("snapshot label", self.snapshot_label(), &props)?
        } else {
            self.version().to_string()
        };
        props.put(keys::PROJECT_EFFECTIVE_VERSION, effective);
        Ok(props)
    }

    /// The snapshot label for snapshots, the plain version otherwise.
    pub fn effective_version(&self) -> Result<String> {
        Ok(self.props()?.effective_version())
    }

    #[cfg(test)]
    pub(crate) fn for_tests(name: &str, version: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            version: Some(version.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_detection() {
        let mut project = Project::for_tests("app", "1.0.0-SNAPSHOT");
        assert!(project.is_snapshot());
        assert_eq!(project.effective_version().unwrap(), "early-access");

        project.snapshot.enabled = Some(false);
        assert!(!project.is_snapshot());
        assert_eq!(project.effective_version().unwrap(), "1.0.0-SNAPSHOT");
    }

    #[test]
    fn snapshot_label_is_templated() {
        let mut project = Project::for_tests("app", "2.0.0-SNAPSHOT");
        project.snapshot.label = Some("{{projectName}}-nightly".to_string());
        assert_eq!(project.effective_version().unwrap(), "app-nightly");
    }

    #[test]
    fn validation_collects_all_problems() {
        let mut project = Project::default();
        project.version = Some("not-a-version".into());
        let mut errors = ValidationErrors::new();
        project.validate(&mut errors);
        assert_eq!(errors.len(), 2);
        assert!(errors.messages()[1].contains("SEMVER"));
    }

    #[test]
    fn props_carry_version_parts() {
        let mut project = Project::for_tests("my-app", "1.4.2");
        project.authors = vec!["Ann".into(), "Bo".into()];
        project.java.main_class = Some("com.acme.Main".into());
        project
            .extra_properties
            .insert("color".into(), serde_json::Value::from("blue"));

        let props = project.props().unwrap();
        assert_eq!(props.text("projectNameCapitalized"), "My-app");
        assert_eq!(props.text("versionMinor"), "4");
        assert_eq!(props.text("projectAuthorsByComma"), "Ann,Bo");
        assert_eq!(props.text("projectJavaMainClass"), "com.acme.Main");
        assert_eq!(props.text("projectColor"), "blue");
        assert_eq!(props.effective_version(), "1.4.2");
        assert!(!project.is_prerelease());
        assert!(Project::for_tests("a", "1.0.0-rc.1").is_prerelease());
    }
}

//! Docker image settings.

use super::{
    DistributionType, ExtraProperties, PackagerConfig, PackagerType, env, inherit_list,
    inherit_text, platform::is_linux,
};

const ZIP: &[&str] = &[".zip"];
const JAR: &[&str] = &[".jar"];

pub const DEFAULT_IMAGE_NAME: &str = "{{repoOwner}}/{{distributionName}}:{{tagName}}";

/// A registry images are pushed to.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct DockerRegistry {
    /// Registry host. Blank means Docker Hub.
    pub server_name: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl DockerRegistry {
    /// Password from `KODEGEN_DOCKER_<SERVER>_PASSWORD`, then the configured value.
    pub fn resolve_password(&self) -> Option<String> {
        let server = if self.server_name.is_empty() { "hub" } else { &self.server_name };
        env::resolve(&format!("docker_{}_password", server), self.password.as_deref())
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Docker {
    pub base_image: Option<String>,
    pub image_names: Vec<String>,
    pub labels: ExtraProperties,
    pub build_args: Vec<String>,
    pub pre_commands: Vec<String>,
    pub post_commands: Vec<String>,
    pub registries: Vec<DockerRegistry>,
}

impl Docker {
    /// Configured base image or one suited to `distribution_type`.
    pub fn base_image(&self, distribution_type: DistributionType) -> String {
        if let Some(image) = self.base_image.as_deref().filter(|i| !i.trim().is_empty()) {
            return image.to_string();
        }
        match distribution_type {
            DistributionType::JavaBinary | DistributionType::SingleJar => {
                "azul/zulu-openjdk-alpine:{{distributionJavaVersion}}-jre".to_string()
            }
            _ => "alpine:latest".to_string(),
        }
    }

    pub fn image_names(&self) -> Vec<String> {
        if self.image_names.is_empty() {
            vec![DEFAULT_IMAGE_NAME.to_string()]
        } else {
            self.image_names.clone()
        }
    }

    /// Labels with the OCI defaults underneath the configured ones.
    pub fn labels(&self) -> ExtraProperties {
        let defaults = [
            ("org.opencontainers.image.title", "{{distributionName}}"),
            ("org.opencontainers.image.description", "{{projectDescription}}"),
            ("org.opencontainers.image.url", "{{projectWebsite}}"),
            ("org.opencontainers.image.licenses", "{{projectLicense}}"),
            ("org.opencontainers.image.version", "{{projectVersion}}"),
        ];
        let mut labels: ExtraProperties = defaults
            .into_iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
            .collect();
        for (key, value) in &self.labels {
            labels.insert(key.clone(), value.clone());
        }
        labels
    }
}

impl PackagerConfig for Docker {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Docker
    }

    fn supported_extensions(&self, distribution_type: DistributionType) -> &'static [&'static str] {
        match distribution_type {
            DistributionType::NativePackage => &[],
            DistributionType::SingleJar => JAR,
            _ => ZIP,
        }
    }

    fn supports_platform(&self, platform: &str) -> bool {
        platform.is_empty() || is_linux(platform)
    }

    fn supports_snapshot(&self) -> bool {
        true
    }

    fn merge_from(&mut self, parent: &Self) {
        inherit_text(&mut self.base_image, &parent.base_image);
        inherit_list(&mut self.image_names, &parent.image_names);
        super::merge_extra_properties(&mut self.labels, &parent.labels);
        inherit_list(&mut self.build_args, &parent.build_args);
        if self.pre_commands.is_empty() {
            self.pre_commands.clone_from(&parent.pre_commands);
        }
        if self.post_commands.is_empty() {
            self.post_commands.clone_from(&parent.post_commands);
        }
        for registry in &parent.registries {
            if !self.registries.iter().any(|r| r.server_name == registry.server_name) {
                self.registries.push(registry.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_by_type() {
        let docker = Docker::default();
        assert_eq!(docker.base_image(DistributionType::Binary), "alpine:latest");
        assert!(docker.base_image(DistributionType::SingleJar).contains("openjdk"));
        assert_eq!(docker.image_names(), vec![DEFAULT_IMAGE_NAME.to_string()]);
        assert_eq!(docker.labels()["org.opencontainers.image.title"], "{{distributionName}}");
    }

    #[test]
    fn registries_merge_by_server() {
        let parent = Docker {
            registries: vec![DockerRegistry {
                server_name: "ghcr.io".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let mut child = Docker {
            registries: vec![DockerRegistry {
                server_name: "ghcr.io".into(),
                username: Some("me".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        child.merge_from(&parent);
        assert_eq!(child.registries.len(), 1);
        assert_eq!(child.registries[0].username.as_deref(), Some("me"));
    }
}

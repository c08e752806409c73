//! Release hosting service (GitHub, GitLab, Gitea, Codeberg or generic).

use super::{env, project::Project};
use crate::release::{
    error::{Result, ValidationErrors},
    props::{PropertyContext, keys},
    templates,
};
use std::{fmt, str::FromStr};

/// Kind of hosting service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum ServiceKind {
    #[default]
    Github,
    Gitlab,
    Gitea,
    Codeberg,
    Generic,
}

impl ServiceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::Github => "github",
            ServiceKind::Gitlab => "gitlab",
            ServiceKind::Gitea => "gitea",
            ServiceKind::Codeberg => "codeberg",
            ServiceKind::Generic => "generic",
        }
    }

    fn default_host(self) -> Option<&'static str> {
        match self {
            ServiceKind::Github => Some("github.com"),
            ServiceKind::Gitlab => Some("gitlab.com"),
            ServiceKind::Codeberg => Some("codeberg.org"),
            ServiceKind::Gitea | ServiceKind::Generic => None,
        }
    }

    fn default_reverse_host(self) -> Option<&'static str> {
        match self {
            ServiceKind::Github => Some("com.github"),
            ServiceKind::Gitlab => Some("com.gitlab"),
            ServiceKind::Codeberg => Some("org.codeberg"),
            ServiceKind::Gitea | ServiceKind::Generic => None,
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(ServiceKind::Github),
            "gitlab" => Ok(ServiceKind::Gitlab),
            "gitea" => Ok(ServiceKind::Gitea),
            "codeberg" => Ok(ServiceKind::Codeberg),
            "generic" => Ok(ServiceKind::Generic),
            other => Err(format!("unknown release service `{}`", other)),
        }
    }
}

impl TryFrom<String> for ServiceKind {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

const REPO: &str = "https://{{repoHost}}/{{repoOwner}}/{{repoName}}";

/// Where releases are published.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct ReleaseService {
    pub service: ServiceKind,
    pub host: Option<String>,
    pub owner: Option<String>,
    pub name: Option<String>,
    pub branch: Option<String>,
    pub username: Option<String>,
    pub token: Option<String>,
    pub tag_name: Option<String>,
    pub release_name: Option<String>,
    pub repo_url: Option<String>,
    pub repo_clone_url: Option<String>,
    pub commit_url: Option<String>,
    pub src_url: Option<String>,
    pub download_url: Option<String>,
    pub release_notes_url: Option<String>,
    pub latest_release_url: Option<String>,
    pub issue_tracker_url: Option<String>,
    pub reverse_repo_host: Option<String>,
    pub upload_assets: Option<bool>,
}

impl ReleaseService {
    /// Whether this service hosts releases. Packagers with taps require it.
    pub fn is_release_supported(&self) -> bool {
        self.service != ServiceKind::Generic
    }

    pub fn resolve_env(&mut self) {
        let kind = self.service.as_str();
        self.username = env::resolve(&format!("{}_username", kind), self.username.as_deref());
        self.token = env::resolve(&format!("{}_token", kind), self.token.as_deref());
    }

    pub fn host(&self) -> &str {
        self.host
            .as_deref()
            .or(self.service.default_host())
            .unwrap_or_default()
    }

    pub fn owner(&self) -> &str {
        self.owner.as_deref().unwrap_or_default()
    }

    /// Repository name, defaulting to the project name.
    pub fn name<'a>(&'a self, project: &'a Project) -> &'a str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(project.name())
    }

    pub fn branch(&self) -> &str {
        self.branch.as_deref().unwrap_or("main")
    }

    pub fn upload_assets(&self) -> bool {
        self.upload_assets.unwrap_or(true)
    }

    pub fn reverse_repo_host(&self) -> Option<&str> {
        self.reverse_repo_host
            .as_deref()
            .or(self.service.default_reverse_host())
            .filter(|h| !h.trim().is_empty())
    }

    fn url_template(&self, configured: &Option<String>, github: &str, gitlab: &str, gitea: &str) -> Option<String> {
        if let Some(url) = configured.as_deref().filter(|u| !u.trim().is_empty()) {
            return Some(url.to_string());
        }
        let suffix = match self.service {
            ServiceKind::Github => github,
            ServiceKind::Gitlab => gitlab,
            ServiceKind::Gitea | ServiceKind::Codeberg => gitea,
            ServiceKind::Generic => return None,
        };
        Some(format!("{}{}", REPO, suffix))
    }

    pub fn repo_url_template(&self) -> Option<String> {
        self.url_template(&self.repo_url, "", "", "")
    }

    pub fn repo_clone_url_template(&self) -> Option<String> {
        self.url_template(&self.repo_clone_url, ".git", ".git", ".git")
    }

    /// Template resolving an artifact's download URL.
    pub fn download_url_template(&self) -> Option<String> {
        self.url_template(
            &self.download_url,
            "/releases/download/{{tagName}}/{{artifactFile}}",
            "/-/releases/{{tagName}}/downloads/{{artifactFile}}",
            "/releases/download/{{tagName}}/{{artifactFile}}",
        )
    }

    fn url_templates(&self) -> [(&'static str, Option<String>); 6] {
        [
            (
                "commitsUrl",
                self.url_template(&self.commit_url, "/commits", "/-/commits", "/commits"),
            ),
            (
                "srcUrl",
                self.url_template(
                    &self.src_url,
                    "/blob/{{repoBranch}}",
                    "/-/blob/{{repoBranch}}",
                    "/src/{{repoBranch}}",
                ),
            ),
            (
                keys::RELEASE_NOTES_URL,
                self.url_template(
                    &self.release_notes_url,
                    "/releases/tag/{{tagName}}",
                    "/-/releases/{{tagName}}",
                    "/releases/tag/{{tagName}}",
                ),
            ),
            (
                keys::LATEST_RELEASE_URL,
                self.url_template(
                    &self.latest_release_url,
                    "/releases/latest",
                    "/-/releases/permalink/latest",
                    "/releases/latest",
                ),
            ),
            (
                "issueTrackerUrl",
                self.url_template(&self.issue_tracker_url, "/issues", "/-/issues", "/issues"),
            ),
            (keys::REPO_CLONE_URL, self.repo_clone_url_template()),
        ]
    }

    /// Tag name, or the snapshot label for snapshots.
    pub fn effective_tag_name(&self, project: &Project, props: &PropertyContext) -> Result<String> {
        if project.is_snapshot() {
            return templates::render_str("snapshot label", project.snapshot_label(), props);
        }
        let template = self.tag_name.as_deref().unwrap_or("v{{projectVersion}}");
        templates::render_str("tag name", template, props)
    }

    pub fn validate(&self, project: &Project, errors: &mut ValidationErrors) {
        if !self.is_release_supported() {
            return;
        }
        if self.owner().trim().is_empty() {
            errors.configuration(format!("release.{}.owner must not be blank", self.service));
        }
        if self.host().trim().is_empty() {
            errors.configuration(format!("release.{}.host must not be blank", self.service));
        }
        if self.name(project).trim().is_empty() {
            errors.configuration(format!("release.{}.name must not be blank", self.service));
        }
    }

    /// Renders the repository URL for another repository on the same host.
    pub fn resolve_repo_url(&self, owner: &str, name: &str) -> Result<String> {
        self.render_for_repo(self.repo_url_template(), owner, name)
    }

    /// Renders the clone URL for another repository on the same host.
    pub fn resolve_clone_url(&self, owner: &str, name: &str) -> Result<String> {
        self.render_for_repo(self.repo_clone_url_template(), owner, name)
    }

    fn render_for_repo(&self, template: Option<String>, owner: &str, name: &str) -> Result<String> {
        let Some(template) = template else {
            return Ok(String::new());
        };
        let mut props = PropertyContext::new();
        props.put(keys::REPO_HOST, self.host());
        props.put(keys::REPO_OWNER, owner);
        props.put(keys::REPO_NAME, name);
        props.put(keys::REPO_BRANCH, self.branch());
        templates::render_str("repository url", &template, &props)
    }

    /// Adds release identity keys to `props`, overwriting existing values.
    pub fn fill_props(&self, project: &Project, props: &mut PropertyContext) -> Result<()> {
        let name = self.name(project).to_string();
        props.put(keys::REPO_HOST, self.host());
        props.put(keys::REPO_OWNER, self.owner());
        props.put(keys::REPO_NAME, name.as_str());
        props.put(keys::REPO_BRANCH, self.branch());
        props.put(keys::REPO_CANONICAL_NAME, format!("{}/{}", self.owner(), name));

        let tag_name = self.effective_tag_name(project, props)?;
        props.put(keys::TAG_NAME, tag_name);
        let release_name = self.release_name.as_deref().unwrap_or("Release {{tagName}}");
        let release_name = templates::render_str("release name", release_name, props)?;
        props.put(keys::RELEASE_NAME, release_name);

        if let Some(repo_url) = self.repo_url_template() {
            let url = templates::render_str("repoUrl", &repo_url, props)?;
            props.put(keys::REPO_URL, url);
        }
        for (key, template) in self.url_templates() {
            if let Some(template) = template {
                let url = templates::render_str(key, &template, props)?;
                props.put(key, url);
            }
        }
        props.put(
            keys::REVERSE_REPO_HOST,
            self.reverse_repo_host().unwrap_or_default(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gitlab() -> ReleaseService {
        ReleaseService {
            service: ServiceKind::Gitlab,
            owner: Some("acme".into()),
            ..Default::default()
        }
    }

    #[test]
    fn gitlab_defaults() {
        let project = Project::for_tests("app", "1.2.3");
        let mut props = project.props().unwrap();
        gitlab().fill_props(&project, &mut props).unwrap();

        assert_eq!(props.text("repoUrl"), "https://gitlab.com/acme/app");
        assert_eq!(props.text("tagName"), "v1.2.3");
        assert_eq!(props.text("releaseName"), "Release v1.2.3");
        assert_eq!(props.text("reverseRepoHost"), "com.gitlab");
        assert_eq!(
            props.text("releaseNotesUrl"),
            "https://gitlab.com/acme/app/-/releases/v1.2.3"
        );
        assert_eq!(
            gitlab().download_url_template().unwrap(),
            "https://{{repoHost}}/{{repoOwner}}/{{repoName}}/-/releases/{{tagName}}/downloads/{{artifactFile}}"
        );
    }

    #[test]
    fn snapshot_tag_is_label() {
        let project = Project::for_tests("app", "1.2.3-SNAPSHOT");
        let props = project.props().unwrap();
        assert_eq!(gitlab().effective_tag_name(&project, &props).unwrap(), "early-access");
    }

    #[test]
    fn generic_has_no_releases() {
        let generic = ReleaseService {
            service: ServiceKind::Generic,
            ..Default::default()
        };
        assert!(!generic.is_release_supported());
        assert!(generic.download_url_template().is_none());
        assert!(generic.reverse_repo_host().is_none());

        let mut errors = ValidationErrors::new();
        generic.validate(&Project::for_tests("a", "1.0.0"), &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn gitea_needs_host() {
        let gitea = ReleaseService {
            service: ServiceKind::Gitea,
            owner: Some("acme".into()),
            ..Default::default()
        };
        let mut errors = ValidationErrors::new();
        gitea.validate(&Project::for_tests("a", "1.0.0"), &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors.messages()[0].contains("host"));
    }

    #[test]
    fn tap_urls_use_service_host() {
        let service = gitlab();
        assert_eq!(
            service.resolve_clone_url("acme", "homebrew-tap").unwrap(),
            "https://gitlab.com/acme/homebrew-tap.git"
        );
    }
}

//! Git repositories packagers push generated descriptors into.

use super::{Active, EnabledState, env, inherit, inherit_text, project::Project, release::ReleaseService};
use crate::release::{error::Result, props::PropertyContext, templates};

pub const DEFAULT_COMMIT_MESSAGE: &str = "{{distributionName}} {{tagName}}";
pub const DEFAULT_TAG_NAME: &str = "{{distributionName}}-{{tagName}}";
pub const DEFAULT_BRANCH: &str = "HEAD";

/// Author used for commits made on a tap.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct CommitAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl CommitAuthor {
    pub fn merge_from(&mut self, parent: &CommitAuthor) {
        inherit_text(&mut self.name, &parent.name);
        inherit_text(&mut self.email, &parent.email);
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("kodegen-bot")
    }

    pub fn email(&self) -> &str {
        self.email.as_deref().unwrap_or("bot@kodegen.dev")
    }
}

/// A repository tap: Homebrew tap, Scoop bucket, JBang catalog and the like.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct RepositoryTap {
    pub active: Option<Active>,
    #[serde(skip)]
    pub enabled: EnabledState,
    pub owner: Option<String>,
    pub name: Option<String>,
    pub branch: Option<String>,
    pub username: Option<String>,
    pub token: Option<String>,
    pub commit_message: Option<String>,
    pub tag_name: Option<String>,
    /// Prefix of the environment variables holding credentials.
    #[serde(skip)]
    pub basename: String,
    /// Name used when `name` is unset.
    #[serde(skip)]
    pub tap_name: String,
}

impl RepositoryTap {
    /// Sets the packager specific fallbacks.
    pub fn configure(&mut self, basename: &str, tap_name: &str) {
        self.basename = basename.to_string();
        self.tap_name = tap_name.to_string();
    }

    pub fn merge_from(&mut self, parent: &RepositoryTap) {
        inherit(&mut self.active, &parent.active);
        inherit_text(&mut self.owner, &parent.owner);
        inherit_text(&mut self.name, &parent.name);
        inherit_text(&mut self.branch, &parent.branch);
        inherit_text(&mut self.username, &parent.username);
        inherit_text(&mut self.token, &parent.token);
        inherit_text(&mut self.commit_message, &parent.commit_message);
        inherit_text(&mut self.tag_name, &parent.tag_name);
    }

    /// Resolves the enabled flag once. Taps default to `RELEASE`.
    pub fn resolve_enabled(&mut self, project: &Project) -> bool {
        let active = *self.active.get_or_insert(Active::Release);
        self.enabled.resolve(|| active.check(project))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.is_enabled()
    }

    pub fn disable(&mut self) {
        self.active = Some(Active::Never);
        self.enabled.disable();
    }

    pub fn owner(&self) -> &str {
        self.owner.as_deref().unwrap_or_default()
    }

    pub fn resolved_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.tap_name)
    }

    /// `owner/name`.
    pub fn canonical_repo_name(&self) -> String {
        format!("{}/{}", self.owner(), self.resolved_name())
    }

    pub fn branch(&self) -> &str {
        self.branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    fn credential(&self, service: &ReleaseService, suffix: &str, configured: &Option<String>) -> Option<String> {
        let key = format!("{}_{}_{}", self.basename, service.service.as_str(), suffix);
        env::resolve(&key, configured.as_deref())
    }

    /// Tap username: env, configured value, release service.
    pub fn resolve_username(&self, service: &ReleaseService) -> Option<String> {
        self.credential(service, "username", &self.username)
            .or_else(|| service.username.clone())
    }

    /// Tap token: env, configured value, release service.
    pub fn resolve_token(&self, service: &ReleaseService) -> Option<String> {
        self.credential(service, "token", &self.token)
            .or_else(|| service.token.clone())
    }

    pub fn resolved_commit_message(&self, props: &PropertyContext) -> Result<String> {
        let template = self.commit_message.as_deref().unwrap_or(DEFAULT_COMMIT_MESSAGE);
        templates::render_str("tap commit message", template, props)
    }

    pub fn resolved_tag_name(&self, props: &PropertyContext) -> Result<String> {
        let template = self.tag_name.as_deref().unwrap_or(DEFAULT_TAG_NAME);
        templates::render_str("tap tag name", template, props)
    }

    /// Properties describing the tap, exposed as `<prefix>Repository*`.
    pub fn fill_props(&self, prefix: &str, props: &mut PropertyContext) {
        props.put(format!("{}RepositoryOwner", prefix), self.owner());
        props.put(format!("{}RepositoryName", prefix), self.resolved_name());
        props.put(format!("{}RepositoryCanonicalName", prefix), self.canonical_repo_name());
        props.put(format!("{}RepositoryBranch", prefix), self.branch());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_falls_back_to_tap_name() {
        let mut tap = RepositoryTap::default();
        tap.configure("homebrew", "homebrew-tap");
        tap.owner = Some("acme".into());
        assert_eq!(tap.resolved_name(), "homebrew-tap");
        assert_eq!(tap.canonical_repo_name(), "acme/homebrew-tap");

        tap.name = Some("formulae".into());
        assert_eq!(tap.canonical_repo_name(), "acme/formulae");
    }

    #[test]
    fn taps_default_to_release() {
        let mut tap = RepositoryTap::default();
        assert!(tap.resolve_enabled(&Project::for_tests("a", "1.0.0")));
        assert_eq!(tap.active, Some(Active::Release));

        let mut snapshot_tap = RepositoryTap::default();
        assert!(!snapshot_tap.resolve_enabled(&Project::for_tests("a", "1.0.0-SNAPSHOT")));
    }

    #[test]
    fn credentials_fall_back_to_service() {
        let mut tap = RepositoryTap::default();
        tap.configure("unit_test_tap", "tap");
        let service = ReleaseService {
            username: Some("svc".into()),
            token: Some("svc-token".into()),
            ..Default::default()
        };
        assert_eq!(tap.resolve_token(&service).as_deref(), Some("svc-token"));

        tap.token = Some("own".into());
        assert_eq!(tap.resolve_token(&service).as_deref(), Some("own"));
        assert_eq!(tap.resolve_username(&service).as_deref(), Some("svc"));
    }

    #[test]
    fn commit_message_is_templated() {
        let tap = RepositoryTap::default();
        let mut props = PropertyContext::new();
        props.put("distributionName", "app");
        props.put("tagName", "v1.0.0");
        assert_eq!(tap.resolved_commit_message(&props).unwrap(), "app v1.0.0");
        assert_eq!(tap.resolved_tag_name(&props).unwrap(), "app-v1.0.0");
    }
}

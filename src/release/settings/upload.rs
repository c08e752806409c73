//! Artifact uploaders.

use super::{Active, EnabledState, env, project::Project};
use crate::release::{
    error::{Result, ValidationErrors},
    props::{PropertyContext, capitalize},
    templates,
};

/// A configured upload target such as an HTTP server or an S3 bucket.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct UploaderConfig {
    /// Uploader kind: `http`, `s3`, `artifactory`, ...
    pub kind: String,
    pub name: String,
    pub active: Option<Active>,
    #[serde(skip)]
    pub enabled: EnabledState,
    /// Where artifacts are sent. May contain templates.
    pub upload_url: Option<String>,
    /// Where artifacts can be fetched from. May contain templates.
    pub download_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UploaderConfig {
    pub fn resolve_env(&mut self) {
        let prefix = format!("{}_{}", self.kind, self.name);
        self.username = env::resolve(&format!("{}_username", prefix), self.username.as_deref());
        self.password = env::resolve(&format!("{}_password", prefix), self.password.as_deref());
    }

    /// Uploaders default to `ALWAYS`.
    pub fn resolve_enabled(&mut self, project: &Project) -> bool {
        let active = *self.active.get_or_insert(Active::Always);
        self.enabled.resolve(|| active.check(project))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.is_enabled()
    }

    /// Key under which the download URL is exposed: `<prefix><Kind><Name>Url`.
    pub fn url_key(&self, prefix: &str) -> String {
        format!("{}{}{}Url", prefix, capitalize(&self.kind), capitalize(&self.name))
    }

    pub fn resolve_download_url(&self, props: &PropertyContext) -> Result<Option<String>> {
        match self.download_url.as_deref() {
            Some(template) => templates::render_str("download url", template, props).map(Some),
            None => Ok(None),
        }
    }

    pub fn validate(&mut self, index: usize, project: &Project, errors: &mut ValidationErrors) {
        if self.kind.trim().is_empty() {
            errors.configuration(format!("upload[{}].kind must not be blank", index));
        }
        if self.name.trim().is_empty() {
            errors.configuration(format!("upload[{}].name must not be blank", index));
        }
        if !self.resolve_enabled(project) {
            return;
        }
        if self.upload_url.as_deref().is_none_or(|u| u.trim().is_empty()) {
            errors.configuration(format!("upload.{}.upload_url must not be blank", self.name));
        }
        if self.download_url.as_deref().is_none_or(|u| u.trim().is_empty()) {
            errors.configuration(format!("upload.{}.download_url must not be blank", self.name));
        }
    }
}

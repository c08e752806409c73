//! Release announcers.

use super::{Active, EnabledState, env, project::Project};
use crate::release::{
    error::{Result, ValidationErrors},
    props::PropertyContext,
    templates,
};

pub const DEFAULT_MESSAGE: &str =
    "🚀 {{projectNameCapitalized}} {{projectVersion}} has been released! {{releaseNotesUrl}}";

/// A messaging channel notified once the release is out.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct AnnouncerConfig {
    /// `slack`, `discord`, `webhook`, `log`, ...
    pub kind: String,
    /// Defaults to the kind.
    pub name: Option<String>,
    pub active: Option<Active>,
    #[serde(skip)]
    pub enabled: EnabledState,
    pub message: Option<String>,
    /// Incoming webhook endpoint for webhook based channels.
    pub webhook: Option<String>,
}

impl AnnouncerConfig {
    pub fn name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.kind)
    }

    /// Announcers default to `ALWAYS`.
    pub fn resolve_enabled(&mut self, project: &Project) -> bool {
        let active = *self.active.get_or_insert(Active::Always);
        self.enabled.resolve(|| active.check(project))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.is_enabled()
    }

    pub fn resolve_env(&mut self) {
        let key = format!("{}_webhook", self.name());
        self.webhook = env::resolve(&key, self.webhook.as_deref());
    }

    pub fn resolve_message(&self, props: &PropertyContext) -> Result<String> {
        let template = self.message.as_deref().unwrap_or(DEFAULT_MESSAGE);
        templates::render_str("announcement", template, props)
    }

    pub fn validate(&mut self, index: usize, project: &Project, errors: &mut ValidationErrors) {
        if self.kind.trim().is_empty() {
            errors.configuration(format!("announce[{}].kind must not be blank", index));
            return;
        }
        self.resolve_env();
        if !self.resolve_enabled(project) {
            return;
        }
        let needs_webhook = matches!(self.kind.as_str(), "slack" | "discord" | "webhook");
        if needs_webhook && self.webhook.as_deref().is_none_or(|w| w.trim().is_empty()) {
            errors.configuration(format!("announce.{}.webhook must not be blank", self.name()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_message() {
        let announcer = AnnouncerConfig {
            kind: "log".into(),
            ..Default::default()
        };
        let mut props = PropertyContext::new();
        props.put("projectNameCapitalized", "App");
        props.put("projectVersion", "1.0.0");
        props.put("releaseNotesUrl", "https://example.com/v1.0.0");
        assert_eq!(
            announcer.resolve_message(&props).unwrap(),
            "🚀 App 1.0.0 has been released! https://example.com/v1.0.0"
        );
        assert_eq!(announcer.name(), "log");
    }

    #[test]
    fn slack_needs_webhook() {
        let mut announcer = AnnouncerConfig {
            kind: "slack".into(),
            name: Some("unit-test-slack".into()),
            ..Default::default()
        };
        let mut errors = ValidationErrors::new();
        announcer.validate(0, &Project::for_tests("a", "1.0.0"), &mut errors);
        assert_eq!(errors.len(), 1);
    }
}

//! Artifact signing policy.

use super::{Active, EnabledState, env, project::Project};
use crate::release::error::ValidationErrors;

/// Where the signing key comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SigningMode {
    /// Key already present in the local gpg keyring.
    #[default]
    #[serde(alias = "command")]
    Command,
    /// Armored keys supplied through configuration or environment.
    #[serde(alias = "memory")]
    Memory,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Signing {
    pub active: Option<Active>,
    #[serde(skip)]
    pub enabled: EnabledState,
    pub armored: Option<bool>,
    pub mode: SigningMode,
    pub public_key: Option<String>,
    pub secret_key: Option<String>,
    pub passphrase: Option<String>,
    /// Key id passed to `--local-user` in command mode.
    pub key_name: Option<String>,
    pub executable: Option<String>,
}

impl Signing {
    pub fn resolve_env(&mut self) {
        self.passphrase = env::resolve("gpg_passphrase", self.passphrase.as_deref());
        self.public_key = env::resolve("gpg_public_key", self.public_key.as_deref());
        self.secret_key = env::resolve("gpg_secret_key", self.secret_key.as_deref());
    }

    /// Signing defaults to `NEVER`.
    pub fn resolve_enabled(&mut self, project: &Project) -> bool {
        let active = *self.active.get_or_insert(Active::Never);
        self.enabled.resolve(|| active.check(project))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.is_enabled()
    }

    pub fn is_armored(&self) -> bool {
        self.armored.unwrap_or(false)
    }

    pub fn executable(&self) -> &str {
        self.executable.as_deref().unwrap_or("gpg")
    }

    /// `.asc` for armored signatures, `.sig` otherwise.
    pub fn signature_extension(&self) -> &'static str {
        if self.is_armored() { ".asc" } else { ".sig" }
    }

    pub fn validate(&mut self, project: &Project, errors: &mut ValidationErrors) {
        if !self.resolve_enabled(project) {
            return;
        }
        let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());
        if blank(&self.passphrase) {
            errors.configuration("signing.passphrase must not be blank");
        }
        if self.mode == SigningMode::Memory {
            if blank(&self.public_key) {
                errors.configuration("signing.public_key must not be blank");
            }
            if blank(&self.secret_key) {
                errors.configuration("signing.secret_key must not be blank");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_by_default() {
        let mut signing = Signing::default();
        let mut errors = ValidationErrors::new();
        signing.validate(&Project::for_tests("a", "1.0.0"), &mut errors);
        assert!(errors.is_empty());
        assert!(!signing.is_enabled());
    }

    #[test]
    fn memory_mode_needs_keys() {
        let mut signing = Signing {
            active: Some(Active::Always),
            mode: SigningMode::Memory,
            passphrase: Some("secret".into()),
            ..Default::default()
        };
        let mut errors = ValidationErrors::new();
        signing.validate(&Project::for_tests("a", "1.0.0"), &mut errors);
        assert_eq!(errors.len(), 2);
        assert_eq!(signing.signature_extension(), ".sig");
    }
}

//! Activation policy and the resolved enabled flag.

use super::project::Project;
use std::{fmt, str::FromStr};

/// When an entity takes part in a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Active {
    Never,
    Always,
    Release,
    Snapshot,
    Prerelease,
    ReleasePrerelease,
}

impl Active {
    /// Evaluates the policy against the state of `project`.
    pub fn check(self, project: &Project) -> bool {
        let snapshot = project.is_snapshot();
        match self {
            Active::Never => false,
            Active::Always => true,
            Active::Release | Active::ReleasePrerelease => !snapshot,
            Active::Snapshot => snapshot,
            Active::Prerelease => !snapshot && project.is_prerelease(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Active::Never => "NEVER",
            Active::Always => "ALWAYS",
            Active::Release => "RELEASE",
            Active::Snapshot => "SNAPSHOT",
            Active::Prerelease => "PRERELEASE",
            Active::ReleasePrerelease => "RELEASE_PRERELEASE",
        }
    }
}

impl fmt::Display for Active {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Active {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "NEVER" => Ok(Active::Never),
            "ALWAYS" => Ok(Active::Always),
            "RELEASE" => Ok(Active::Release),
            "SNAPSHOT" => Ok(Active::Snapshot),
            "PRERELEASE" => Ok(Active::Prerelease),
            "RELEASE_PRERELEASE" => Ok(Active::ReleasePrerelease),
            other => Err(format!("unknown active value `{}`", other)),
        }
    }
}

impl TryFrom<String> for Active {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Active> for String {
    fn from(value: Active) -> Self {
        value.as_str().to_string()
    }
}

/// Resolution state of an entity's `enabled` flag.
///
/// Moves from `Unresolved` to `Enabled` or `Disabled` once per run. The only
/// later transition is a forced [`disable`](EnabledState::disable).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnabledState {
    #[default]
    Unresolved,
    Enabled,
    Disabled,
}

impl EnabledState {
    /// Computes the flag on first call and returns the cached value afterwards.
    pub fn resolve(&mut self, compute: impl FnOnce() -> bool) -> bool {
        if *self == EnabledState::Unresolved {
            *self = if compute() {
                EnabledState::Enabled
            } else {
                EnabledState::Disabled
            };
        }
        self.is_enabled()
    }

    pub fn is_enabled(self) -> bool {
        self == EnabledState::Enabled
    }

    pub fn is_resolved(self) -> bool {
        self != EnabledState::Unresolved
    }

    pub fn disable(&mut self) {
        *self = EnabledState::Disabled;
    }
}

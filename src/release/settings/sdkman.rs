//! SDKMAN! settings.

use super::{DistributionType, PackagerConfig, PackagerType, env, inherit, inherit_text};
use std::{fmt, str::FromStr};

pub const DEFAULT_CONNECT_TIMEOUT: u64 = 20;
pub const DEFAULT_READ_TIMEOUT: u64 = 60;
const MAX_TIMEOUT: u64 = 300;

const ZIP: &[&str] = &[".zip"];

/// SDKMAN! release endpoint to call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum SdkmanCommand {
    /// New default version, announced to every user.
    #[default]
    Major,
    /// Release without changing the default version.
    Minor,
}

impl SdkmanCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            SdkmanCommand::Major => "major",
            SdkmanCommand::Minor => "minor",
        }
    }
}

impl fmt::Display for SdkmanCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SdkmanCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(SdkmanCommand::Major),
            "minor" => Ok(SdkmanCommand::Minor),
            _ => Err(format!("unknown sdkman command `{}`", s)),
        }
    }
}

impl TryFrom<String> for SdkmanCommand {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Sdkman {
    /// Candidate name, the project name by default.
    pub candidate: Option<String>,
    pub release_notes_url: Option<String>,
    pub command: Option<SdkmanCommand>,
    pub consumer_key: Option<String>,
    pub consumer_token: Option<String>,
    /// Seconds.
    pub connect_timeout: Option<u64>,
    /// Seconds.
    pub read_timeout: Option<u64>,
}

impl Sdkman {
    pub fn resolve_env(&mut self) {
        self.consumer_key = env::resolve("sdkman_consumer_key", self.consumer_key.as_deref());
        self.consumer_token = env::resolve("sdkman_consumer_token", self.consumer_token.as_deref());
    }

    pub fn command(&self) -> SdkmanCommand {
        self.command.unwrap_or_default()
    }

    /// Timeouts outside `1..=300` fall back to their defaults.
    pub fn connect_timeout(&self) -> u64 {
        bounded(self.connect_timeout, DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn read_timeout(&self) -> u64 {
        bounded(self.read_timeout, DEFAULT_READ_TIMEOUT)
    }

    /// SDKMAN! platform id for an artifact platform tag.
    pub fn platform_id(platform: &str) -> &'static str {
        match platform {
            "osx-x86_64" => "MAC_OSX",
            "osx-aarch_64" => "MAC_ARM64",
            "linux-x86_64" => "LINUX_64",
            "linux-x86_32" => "LINUX_32",
            "linux-aarch_64" => "LINUX_ARM64",
            "windows-x86_64" => "WINDOWS_64",
            _ => "UNIVERSAL",
        }
    }
}

fn bounded(value: Option<u64>, default: u64) -> u64 {
    value
        .filter(|v| (1..=MAX_TIMEOUT).contains(v))
        .unwrap_or(default)
}

impl PackagerConfig for Sdkman {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Sdkman
    }

    fn supported_extensions(&self, distribution_type: DistributionType) -> &'static [&'static str] {
        match distribution_type {
            DistributionType::JavaBinary | DistributionType::Jlink | DistributionType::NativeImage => ZIP,
            _ => &[],
        }
    }

    fn supports_platform(&self, _platform: &str) -> bool {
        true
    }

    fn merge_from(&mut self, parent: &Self) {
        inherit_text(&mut self.candidate, &parent.candidate);
        inherit_text(&mut self.release_notes_url, &parent.release_notes_url);
        inherit(&mut self.command, &parent.command);
        inherit_text(&mut self.consumer_key, &parent.consumer_key);
        inherit_text(&mut self.consumer_token, &parent.consumer_token);
        inherit(&mut self.connect_timeout, &parent.connect_timeout);
        inherit(&mut self.read_timeout, &parent.read_timeout);
    }
}

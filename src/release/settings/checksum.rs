//! Checksum policy.

use crate::release::props::capitalize;
use std::{fmt, str::FromStr};

/// Digest algorithms available for artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum Algorithm {
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl Algorithm {
    /// Lower-case name used in file names: `sha256`.
    pub fn formatted(self) -> &'static str {
        match self {
            Algorithm::Md5 => "md5",
            Algorithm::Sha1 => "sha1",
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha384 => "sha384",
            Algorithm::Sha512 => "sha512",
        }
    }

    /// Name used in property keys: `Sha256`.
    pub fn key_suffix(self) -> String {
        capitalize(self.formatted())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.formatted())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "md5" => Ok(Algorithm::Md5),
            "sha1" => Ok(Algorithm::Sha1),
            "sha256" => Ok(Algorithm::Sha256),
            "sha384" => Ok(Algorithm::Sha384),
            "sha512" => Ok(Algorithm::Sha512),
            _ => Err(format!("unsupported checksum algorithm `{}`", s)),
        }
    }
}

impl TryFrom<String> for Algorithm {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

pub const DEFAULT_CHECKSUM_NAME: &str = "checksums.txt";

/// Which digests to compute and how to store them.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct Checksum {
    pub name: Option<String>,
    pub individual: Option<bool>,
    pub algorithms: Vec<Algorithm>,
}

impl Checksum {
    /// Configured algorithms without duplicates, `sha256` when none.
    pub fn algorithms(&self) -> Vec<Algorithm> {
        let mut algorithms: Vec<Algorithm> = Vec::new();
        for algorithm in &self.algorithms {
            if !algorithms.contains(algorithm) {
                algorithms.push(*algorithm);
            }
        }
        if algorithms.is_empty() {
            algorithms.push(Algorithm::Sha256);
        }
        algorithms
    }

    pub fn is_individual(&self) -> bool {
        self.individual.unwrap_or(false)
    }

    pub fn name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(DEFAULT_CHECKSUM_NAME)
    }

    /// File name holding digests for `algorithm`.
    ///
    /// With several algorithms configured, `_<alg>` is inserted before the
    /// last dot so each algorithm gets its own file.
    pub fn resolved_name(&self, algorithm: Algorithm) -> String {
        let name = self.name();
        if self.algorithms().len() == 1 {
            return name.to_string();
        }
        match name.rfind('.') {
            Some(dot) => format!("{}_{}{}", &name[..dot], algorithm.formatted(), &name[dot..]),
            None => format!("{}_{}", name, algorithm.formatted()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        assert_eq!("SHA-256".parse::<Algorithm>().unwrap(), Algorithm::Sha256);
        assert_eq!("sha_512".parse::<Algorithm>().unwrap(), Algorithm::Sha512);
        assert!("crc32".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::Sha256.key_suffix(), "Sha256");
    }

    #[test]
    fn names_per_algorithm() {
        let single = Checksum::default();
        assert_eq!(single.algorithms(), vec![Algorithm::Sha256]);
        assert_eq!(single.resolved_name(Algorithm::Sha256), "checksums.txt");

        let multi = Checksum {
            algorithms: vec![Algorithm::Md5, Algorithm::Sha256, Algorithm::Md5],
            ..Default::default()
        };
        assert_eq!(multi.algorithms().len(), 2);
        assert_eq!(multi.resolved_name(Algorithm::Md5), "checksums_md5.txt");
    }
}

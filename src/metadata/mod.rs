//! Release configuration discovery and loading.
//!
//! The model lives in `release.toml` next to the project. Fields the file
//! leaves unset are completed from the `[package]` section of a sibling
//! `Cargo.toml`, so a Rust project only has to declare what differs.

use crate::error::{CliError, PublishError, Result};
use crate::release::Model;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "release.toml";

/// Project fields read from a Cargo manifest.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub license: Option<String>,
    pub homepage: Option<String>,
}

/// Resolves the configuration file: `explicit` relative to `basedir`, or
/// `release.toml` in `basedir`.
pub fn discover(basedir: &Path, explicit: Option<&Path>) -> Result<PathBuf> {
    let path = match explicit {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => basedir.join(path),
        None => basedir.join(DEFAULT_CONFIG_FILE),
    };
    if !path.is_file() {
        return Err(PublishError::Cli(CliError::ExecutionFailed {
            command: "read_config".to_string(),
            reason: format!("configuration file {} does not exist", path.display()),
        }));
    }
    Ok(path)
}

/// Loads the release model from `path`, completing the project from the
/// `Cargo.toml` next to it when there is one.
pub fn load_model(path: &Path) -> Result<Model> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        PublishError::Cli(CliError::ExecutionFailed {
            command: "read_config".to_string(),
            reason: format!("Failed to read {}: {}", path.display(), e),
        })
    })?;
    let mut model: Model = toml::from_str(&text)?;

    let cargo_toml = path
        .parent()
        .map(|dir| dir.join("Cargo.toml"))
        .filter(|manifest| manifest.is_file());
    if let Some(cargo_toml) = cargo_toml {
        let package = load_package_metadata(&cargo_toml)?;
        complete_project(&mut model, package);
    }
    Ok(model)
}

/// Reads `[package]` from a Cargo manifest. A manifest without one, such as
/// a virtual workspace root, yields empty metadata.
pub fn load_package_metadata(cargo_toml_path: &Path) -> Result<PackageMetadata> {
    let manifest = std::fs::read_to_string(cargo_toml_path).map_err(|e| {
        PublishError::Cli(CliError::ExecutionFailed {
            command: "read_cargo_toml".to_string(),
            reason: format!("Failed to read {}: {}", cargo_toml_path.display(), e),
        })
    })?;
    let toml_value: toml::Value = toml::from_str(&manifest)?;

    let Some(package) = toml_value.get("package") else {
        log::debug!("no [package] section in {}", cargo_toml_path.display());
        return Ok(PackageMetadata::default());
    };
    // `version.workspace = true` is a table, not a string; those are skipped.
    let text = |key: &str| package.get(key).and_then(|v| v.as_str()).map(String::from);

    Ok(PackageMetadata {
        name: text("name"),
        version: text("version"),
        description: text("description"),
        authors: package
            .get("authors")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default(),
        license: text("license"),
        homepage: text("homepage"),
    })
}

/// Fills project fields `release.toml` left unset. Explicit values win.
fn complete_project(model: &mut Model, package: PackageMetadata) {
    let project = &mut model.project;
    let fill = |field: &mut Option<String>, value: Option<String>| {
        if field.as_deref().is_none_or(|v| v.trim().is_empty()) && value.is_some() {
            *field = value;
        }
    };
    fill(&mut project.name, package.name);
    fill(&mut project.version, package.version);
    fill(&mut project.description, package.description);
    fill(&mut project.license, package.license);
    fill(&mut project.website, package.homepage);
    if project.authors.is_empty() {
        project.authors = package.authors;
    }
}

//! Distribution artifacts.

use super::{ExtraProperties, file_type, prefixed_properties};
use crate::release::{
    error::Result,
    props::PropertyContext,
    templates,
};
use serde_json::Value;
use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

/// A file belonging to a distribution.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(default)]
pub struct Artifact {
    /// Path template, relative to the base directory unless absolute.
    pub path: String,
    /// Platform tag such as `osx-x86_64`.
    pub platform: Option<String>,
    pub active: bool,
    /// Free-form properties; also carries skip flags like `skipBrew`.
    pub extra_properties: ExtraProperties,
}

impl Default for Artifact {
    fn default() -> Self {
        Self {
            path: String::new(),
            platform: None,
            active: true,
            extra_properties: ExtraProperties::new(),
        }
    }
}

impl Artifact {
    pub fn new(path: impl Into<String>, platform: Option<&str>) -> Self {
        Self {
            path: path.into(),
            platform: platform.map(str::to_string),
            ..Default::default()
        }
    }

    /// Platform tag, empty when unset.
    pub fn platform(&self) -> &str {
        self.platform.as_deref().unwrap_or_default().trim()
    }

    pub fn has_platform(&self) -> bool {
        !self.platform().is_empty()
    }

    /// Known extension of the declared path, dot included.
    pub fn extension(&self) -> Option<&'static str> {
        file_type::extension_of(&self.path)
    }

    /// Whether the skip flag `key` is set to a truthy value.
    pub fn is_skipped_by(&self, key: &str) -> bool {
        match self.extra_properties.get(key) {
            Some(Value::Bool(skip)) => *skip,
            Some(Value::String(skip)) => skip.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Resolves the path template against `props` and `basedir`.
    ///
    /// Paths holding glob wildcards resolve to their first match in sorted
    /// order. A pattern without matches resolves to itself so the missing
    /// file is reported by whoever reads it.
    pub fn effective_path(&self, basedir: &Path, props: &PropertyContext) -> Result<PathBuf> {
        let rendered = templates::render_str("artifact path", &self.path, props)?;
        let path = PathBuf::from(rendered.trim());
        let path = if path.is_absolute() { path } else { basedir.join(path) };

        let text = path.to_string_lossy();
        if !text.contains(['*', '?', '[']) {
            return Ok(path);
        }
        let mut matches: Vec<PathBuf> = glob::glob(&text)?.filter_map(|entry| entry.ok()).collect();
        matches.sort();
        Ok(matches.into_iter().next().unwrap_or(path))
    }

    /// Extra properties keyed as `<prefix><Key>`.
    pub fn resolved_extra_properties(&self, prefix: &str) -> PropertyContext {
        prefixed_properties(prefix, &self.extra_properties)
    }
}

/// Orders artifacts by platform tag. Blank platforms sort first.
pub fn compare_by_platform(a: &Artifact, b: &Artifact) -> Ordering {
    match (a.has_platform(), b.has_platform()) {
        (false, false) => Ordering::Equal,
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => a.platform().cmp(b.platform()),
    }
}

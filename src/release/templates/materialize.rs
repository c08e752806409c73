//! Turns a template tree into packager output files.

use super::{TemplateEngine, builtin_templates};
use crate::release::{
    error::{ErrorExt, Result},
    props::PropertyContext,
    settings::PackagerType,
};
use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Where a packager's templates come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Directory(PathBuf),
    Builtin(PackagerType),
}

impl TemplateSource {
    /// Picks the configured directory, then the conventional
    /// `<basedir>/src/release/<distribution>/<packager>` one, then the
    /// built-in set.
    pub fn resolve(
        basedir: &Path,
        configured: Option<&str>,
        distribution: &str,
        packager_type: PackagerType,
    ) -> Self {
        if let Some(dir) = configured.filter(|d| !d.trim().is_empty()) {
            return TemplateSource::Directory(basedir.join(dir));
        }
        let conventional = basedir
            .join("src")
            .join("release")
            .join(distribution)
            .join(packager_type.as_str());
        if conventional.is_dir() {
            TemplateSource::Directory(conventional)
        } else {
            TemplateSource::Builtin(packager_type)
        }
    }
}

/// A template file. `name` is relative to the template root and always uses
/// `/` as separator.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    pub name: String,
    pub content: Cow<'static, [u8]>,
}

impl TemplateFile {
    pub fn is_template(&self) -> bool {
        self.name.ends_with(".tpl")
    }

    /// Last path segment of the template name.
    pub fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Removes a trailing `.tpl`.
pub fn trim_tpl(name: &str) -> &str {
    name.strip_suffix(".tpl").unwrap_or(name)
}

/// Lists templates of `source` in sorted order.
pub fn collect_templates(source: &TemplateSource) -> Result<Vec<TemplateFile>> {
    match source {
        TemplateSource::Builtin(packager_type) => Ok(builtin_templates(*packager_type)
            .iter()
            .map(|(name, content)| TemplateFile {
                name: name.to_string(),
                content: Cow::Borrowed(content.as_bytes()),
            })
            .collect()),
        TemplateSource::Directory(root) => {
            if !root.is_dir() {
                crate::bail!("template directory {} does not exist", root.display());
            }
            let mut files = Vec::new();
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = entry?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry.path().strip_prefix(root)?;
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                let content = fs::read(entry.path()).fs_context("reading template", entry.path())?;
                files.push(TemplateFile {
                    name,
                    content: Cow::Owned(content),
                });
            }
            Ok(files)
        }
    }
}

/// Writes `templates` under `output_dir`.
///
/// Names listed in `skip` are ignored. `output_path` maps a template name to
/// its relative output path, or `None` to drop it. `.tpl` files are expanded
/// against `props`, anything else is copied verbatim.
pub fn materialize(
    engine: &dyn TemplateEngine,
    templates: &[TemplateFile],
    props: &PropertyContext,
    output_dir: &Path,
    skip: &[String],
    output_path: &dyn Fn(&str) -> Option<PathBuf>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for template in templates {
        if skip.iter().any(|s| s == &template.name || s == template.file_name()) {
            log::debug!("skipping template {}", template.name);
            continue;
        }
        let Some(relative) = output_path(&template.name) else {
            log::debug!("template {} not needed", template.name);
            continue;
        };
        let target = output_dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).fs_context("creating output directory", parent)?;
        }
        if template.is_template() {
            let text = String::from_utf8_lossy(&template.content);
            let rendered = engine.render(&template.name, &text, props)?;
            fs::write(&target, rendered).fs_context("writing file", &target)?;
        } else {
            fs::write(&target, &template.content).fs_context("writing file", &target)?;
        }
        log::debug!("wrote {}", target.display());
        written.push(target);
    }
    Ok(written)
}

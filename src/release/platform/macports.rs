//! MacPorts Portfiles.

use super::{ToolProcessor, or_default, variant};
use crate::release::{
    builder::ReleaseContext,
    error::Result,
    props::{PropertyContext, keys},
    settings::{Distribution, DistributionType, Packager, PackagerKind, PackagerType},
    templates::trim_tpl,
};
use std::path::PathBuf;

pub struct MacportsProcessor;

/// Continuation used by multi-line Portfile values.
const CONTINUATION: &str = " \\\n                    ";

/// MacPorts' `java.version` takes a minimum version, `1.8+` for Java 8.
fn java_version(version: &str) -> String {
    match version.trim() {
        "8" | "1.8" => "1.8+".to_string(),
        other => format!("{}+", other),
    }
}

/// Replaces the effective version with the Portfile `${version}` variable.
fn versioned(text: &str, version: &str) -> String {
    if version.is_empty() {
        text.to_string()
    } else {
        text.replace(version, "${version}")
    }
}

impl ToolProcessor for MacportsProcessor {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Macports
    }

    fn fill_props(
        &self,
        ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &mut PropertyContext,
    ) -> Result<()> {
        let macports = variant!(packager, Macports);
        let project = &ctx.model().project;

        props.put("macportsPackageName", or_default(&macports.package_name, &distribution.name));
        props.put("macportsRevision", macports.revision());
        let categories = if macports.categories.is_empty() {
            macports.primary_category().to_string()
        } else {
            macports.categories.join(" ")
        };
        props.put("macportsCategories", categories);
        props.put("macportsMaintainers", macports.maintainers.join(CONTINUATION));

        let long_description = project
            .long_description
            .as_deref()
            .or(project.description.as_deref())
            .unwrap_or_default();
        let lines: Vec<&str> = long_description
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        props.put("macportsLongDescription", lines.join(CONTINUATION));

        if distribution.distribution_type == DistributionType::JavaBinary {
            if let Some(version) = distribution.java.version.as_deref().filter(|v| !v.trim().is_empty()) {
                props.put("macportsJavaVersion", java_version(version));
            }
        }

        let version = props.effective_version();
        let url = props.distribution_url();
        let file = props.artifact_file();
        let base_url = url
            .strip_suffix(&format!("/{}", file))
            .unwrap_or(url.as_str())
            .to_string();
        props.put("macportsDistributionUrl", versioned(&base_url, &version));
        let distname = props.text(&format!("{}FileName", keys::DISTRIBUTION_ARTIFACT));
        props.put("macportsDistname", versioned(&distname, &version));
        Ok(())
    }

    fn output_path(&self, packager: &Packager, props: &PropertyContext, template: &str) -> Option<PathBuf> {
        match (&packager.kind, template) {
            (PackagerKind::Macports(macports), "Portfile.tpl") => Some(
                PathBuf::from("ports")
                    .join(macports.primary_category())
                    .join(props.text("macportsPackageName"))
                    .join("Portfile"),
            ),
            _ => Some(PathBuf::from(trim_tpl(template))),
        }
    }
}

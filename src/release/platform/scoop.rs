//! Scoop manifests.

use super::{ToolProcessor, or_default, variant};
use crate::release::{
    builder::ReleaseContext,
    error::Result,
    props::{PropertyContext, keys},
    settings::{Distribution, Packager, PackagerKind, PackagerType},
    templates::{self, trim_tpl},
};
use std::path::PathBuf;

pub struct ScoopProcessor;

/// Scoop substitutes `$version` when it autoupdates a manifest.
fn autoupdate(text: &str, version: &str) -> String {
    if version.is_empty() {
        text.to_string()
    } else {
        text.replace(version, "$version")
    }
}

impl ToolProcessor for ScoopProcessor {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Scoop
    }

    fn fill_props(
        &self,
        _ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &mut PropertyContext,
    ) -> Result<()> {
        let scoop = variant!(packager, Scoop);
        let version = props.effective_version();

        props.put("scoopPackageName", or_default(&scoop.package_name, &distribution.name));
        let checkver = or_default(&scoop.checkver_url, &props.text(keys::LATEST_RELEASE_URL));
        let checkver = templates::render_str("scoop checkver url", &checkver, props)?;
        props.put("scoopCheckverUrl", checkver);

        let url = match scoop.autoupdate_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => templates::render_str("scoop autoupdate url", url, props)?,
            None => autoupdate(&props.distribution_url(), &version),
        };
        props.put("scoopAutoupdateUrl", url);
        let extract_dir = props.text(&format!("{}FileName", keys::DISTRIBUTION_ARTIFACT));
        props.put("scoopAutoupdateExtractDir", autoupdate(&extract_dir, &version));
        Ok(())
    }

    fn output_path(&self, packager: &Packager, props: &PropertyContext, template: &str) -> Option<PathBuf> {
        match (&packager.kind, template) {
            (PackagerKind::Scoop(_), "bucket.json.tpl") => Some(
                PathBuf::from("bucket").join(format!("{}.json", props.text("scoopPackageName"))),
            ),
            _ => Some(PathBuf::from(trim_tpl(template))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::{
        platform::{
            processor_for,
            tests::{fixture, props_for},
        },
        services::recording::RecordingServices,
    };
    use std::fs;

    const MODEL: &str = r#"
        [project]
        name = "app"
        version = "4.0.2"
        description = "An app"
        license = "MIT"

        [release]
        owner = "acme"

        [packagers.scoop]
        active = "ALWAYS"

        [[distributions]]
        name = "app"
        [[distributions.artifacts]]
        path = "dist/app-4.0.2.zip"
    "#;

    #[test]
    fn manifest_autoupdates_by_version() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = fixture(MODEL, dir.path(), &["dist/app-4.0.2.zip"], &RecordingServices::new());
        let props = props_for(&ctx, PackagerType::Scoop);
        assert_eq!(
            props.text("scoopAutoupdateUrl"),
            "https://github.com/acme/app/releases/download/v$version/app-$version.zip"
        );
        assert_eq!(props.text("scoopAutoupdateExtractDir"), "app-$version");
        assert_eq!(
            props.text("scoopCheckverUrl"),
            props.text(keys::LATEST_RELEASE_URL)
        );

        let distribution = &ctx.model().distributions[0];
        let packager = distribution.packagers.get(PackagerType::Scoop).unwrap();
        processor_for(PackagerType::Scoop)
            .prepare(&ctx, distribution, packager, &props)
            .unwrap();
        let manifest = fs::read_to_string(
            ctx.prepare_directory("app", PackagerType::Scoop)
                .join("bucket/app.json"),
        )
        .unwrap();
        let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();
        assert_eq!(manifest["version"], "4.0.2");
        assert_eq!(manifest["extract_dir"], "app-4.0.2");
        assert_eq!(manifest["bin"], "bin/app.exe");
    }
}
